use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Publisher operation errors.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid destination key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type PublishResult<T> = Result<T, PublishError>;

/// Uploads a finished artifact and returns its public reference.
///
/// Safe for concurrent use across distinct destination keys; the orchestrator
/// derives keys from job ids so concurrent jobs never collide.
#[async_trait]
pub trait ObjectPublisher: Send + Sync {
    async fn publish(&self, local_path: &Path, destination_key: &str) -> PublishResult<String>;
}

/// Reject keys that could escape the destination namespace.
pub(crate) fn validate_key(key: &str) -> PublishResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|part| part == "..") {
        return Err(PublishError::InvalidKey(key.to_string()));
    }
    Ok(())
}
