//! Stage error taxonomy.
//!
//! Every pipeline stage fails with a `StageError` variant whose display form
//! starts with the stage tag ("fetch:", "mix:", ...). The orchestrator persists
//! that rendered message verbatim as the job's failure reason, so the tags are
//! part of the observable contract rather than an internal detail.

use std::fmt;

/// Captured outcome of a failed media-engine invocation.
///
/// `exit_code` is `None` when the engine was killed by a signal or when the
/// invocation succeeded but produced no output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub exit_code: Option<i32>,
    pub diagnostic: String,
}

impl EngineFailure {
    pub fn new(exit_code: Option<i32>, diagnostic: impl Into<String>) -> Self {
        Self {
            exit_code,
            diagnostic: diagnostic.into(),
        }
    }

    /// Failure without an engine exit code (spawn error, missing output file).
    pub fn other(diagnostic: impl Into<String>) -> Self {
        Self::new(None, diagnostic)
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exit_code {
            Some(code) => write!(f, "engine exited with code {}: {}", code, self.diagnostic),
            None => write!(f, "{}", self.diagnostic),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("workspace: {0}")]
    Workspace(String),

    #[error("fetch: {0}")]
    Fetch(String),

    #[error("synthesize: {0}")]
    Synthesis(EngineFailure),

    #[error("assemble: {0}")]
    Assembly(EngineFailure),

    #[error("composite: {0}")]
    Composite(EngineFailure),

    #[error("mix: {0}")]
    Mix(EngineFailure),

    #[error("publish: {0}")]
    Publish(String),

    #[error("cancelled")]
    Cancelled,
}

impl StageError {
    /// Stage tag used in persisted failure messages and log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Workspace(_) => "workspace",
            StageError::Fetch(_) => "fetch",
            StageError::Synthesis(_) => "synthesize",
            StageError::Assembly(_) => "assemble",
            StageError::Composite(_) => "composite",
            StageError::Mix(_) => "mix",
            StageError::Publish(_) => "publish",
            StageError::Cancelled => "cancelled",
        }
    }

    /// True for the distinguished cancellation kind (external cancel, not a
    /// stage malfunction).
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StageError::Cancelled)
    }
}

pub type StageResult<T> = Result<T, StageError>;
