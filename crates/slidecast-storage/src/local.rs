//! Local filesystem publisher, used in development and tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::traits::{validate_key, ObjectPublisher, PublishError, PublishResult};

#[derive(Clone)]
pub struct LocalBucket {
    base_path: PathBuf,
    base_url: String,
}

impl LocalBucket {
    /// `base_path` is the root directory artifacts are copied into;
    /// `base_url` is prepended to keys when building the public reference.
    pub async fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> PublishResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            PublishError::Config(format!(
                "Failed to create publish directory {}: {}",
                base_path.display(),
                e
            ))
        })?;
        Ok(Self {
            base_path,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ObjectPublisher for LocalBucket {
    async fn publish(&self, local_path: &Path, destination_key: &str) -> PublishResult<String> {
        validate_key(destination_key)?;

        let dest = self.base_path.join(destination_key);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(local_path, &dest).await?;

        tracing::debug!(key = destination_key, "Artifact published to local bucket");
        Ok(format!("{}/{}", self.base_url, destination_key))
    }
}
