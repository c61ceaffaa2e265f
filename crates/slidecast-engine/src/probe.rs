//! Duration probing via ffprobe.

use std::path::Path;

use slidecast_core::error::EngineFailure;

use crate::command::run_engine_capture;

/// Query a media file's container duration in seconds.
pub async fn media_duration(ffprobe_path: &str, path: &Path) -> Result<f64, EngineFailure> {
    let args = duration_args(path);
    let stdout = run_engine_capture(ffprobe_path, &args, "probe").await?;
    parse_duration(&stdout)
}

pub(crate) fn duration_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        path.to_string_lossy().to_string(),
    ]
}

pub(crate) fn parse_duration(stdout: &str) -> Result<f64, EngineFailure> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| EngineFailure::other(format!("non-numeric duration from probe: '{}'", trimmed)))
}
