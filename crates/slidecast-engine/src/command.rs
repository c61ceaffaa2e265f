//! Shared subprocess runner for media engine invocations.

use std::process::Stdio;
use tokio::process::Command;

use slidecast_core::error::EngineFailure;

/// Upper bound on captured diagnostic text. ffmpeg writes its full progress
/// log to stderr; only the tail is useful in a persisted failure message.
const MAX_DIAGNOSTIC_CHARS: usize = 2000;

/// Run the engine to completion, discarding stdout and capturing stderr.
///
/// The child is spawned with `kill_on_drop`, so a cancelled orchestrator
/// future reaps any in-flight invocation instead of leaking it into a
/// torn-down workspace.
pub(crate) async fn run_engine(
    program: &str,
    args: &[String],
    context: &str,
) -> Result<(), EngineFailure> {
    tracing::debug!(program, context, command = %args.join(" "), "Invoking media engine");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| EngineFailure::other(format!("failed to spawn {}: {}", program, e)))?;

    if output.status.success() {
        tracing::debug!(program, context, "Media engine finished");
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let failure = EngineFailure::new(output.status.code(), diagnostic_tail(&stderr));
    tracing::warn!(
        program,
        context,
        exit_code = ?output.status.code(),
        "Media engine failed"
    );
    Err(failure)
}

/// Run the engine and capture stdout (ffprobe queries).
pub(crate) async fn run_engine_capture(
    program: &str,
    args: &[String],
    context: &str,
) -> Result<String, EngineFailure> {
    tracing::debug!(program, context, command = %args.join(" "), "Invoking media engine");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| EngineFailure::other(format!("failed to spawn {}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EngineFailure::new(
            output.status.code(),
            diagnostic_tail(&stderr),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub(crate) fn diagnostic_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.chars().count() <= MAX_DIAGNOSTIC_CHARS {
        return trimmed.to_string();
    }
    let tail: String = trimmed
        .chars()
        .skip(trimmed.chars().count() - MAX_DIAGNOSTIC_CHARS)
        .collect();
    format!("... {}", tail)
}
