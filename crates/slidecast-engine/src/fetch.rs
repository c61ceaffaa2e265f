//! Asset fetcher: streams remote images/audio into the job workspace.
//!
//! One attempt per asset; resilience comes from the configured time and size
//! budgets, which also bound worst-case job latency.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use slidecast_core::config::FetchConfig;
use slidecast_core::error::{StageError, StageResult};

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Download `url` to `dest`, returning the number of bytes written.
    /// Error details omit the URL; the orchestrator tags errors with the
    /// asset's position and URL.
    async fn fetch(&self, url: &str, dest: &Path) -> StageResult<u64>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    pub fn new(client: Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    async fn fetch_inner(&self, url: Url, dest: &Path) -> Result<u64, String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("transport error: {}", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(format!("status {}", status.as_u16()));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| format!("cannot create {}: {}", dest.display(), e))?;

        let mut written: u64 = 0;
        let mut resp = resp;
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| format!("transport error mid-stream: {}", e))?
        {
            written += chunk.len() as u64;
            if written > self.config.max_bytes {
                return Err(format!(
                    "size budget exceeded ({} bytes)",
                    self.config.max_bytes
                ));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| format!("write error: {}", e))?;
        }
        file.flush().await.map_err(|e| format!("write error: {}", e))?;
        Ok(written)
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> StageResult<u64> {
        let parsed = validate_fetch_url(url).map_err(StageError::Fetch)?;

        let budget = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(budget, self.fetch_inner(parsed, dest)).await {
            Ok(Ok(bytes)) => {
                tracing::debug!(bytes, dest = %dest.display(), "Asset downloaded");
                Ok(bytes)
            }
            Ok(Err(detail)) => Err(StageError::Fetch(detail)),
            Err(_) => Err(StageError::Fetch(format!(
                "timed out after {}s",
                self.config.timeout_secs
            ))),
        }
    }
}

/// Only http(s) URLs are fetchable. Rejecting other schemes up front keeps
/// file:// and friends out of the workspace.
pub fn validate_fetch_url(url: &str) -> Result<Url, String> {
    let parsed = Url::parse(url).map_err(|e| format!("invalid url: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(format!("unsupported url scheme '{}'", other)),
    }
}

/// File extension for a source URL's path, with a per-kind default when the
/// URL carries none. Workspace filenames keep the remote extension so the
/// engine's format detection sees a familiar suffix.
pub fn extension_from_url(url: &str, default: &str) -> String {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') && !stem.is_empty() => {
            format!(".{}", ext)
        }
        _ => default.to_string(),
    }
}
