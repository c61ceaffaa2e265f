//! HTTP bucket publisher.
//!
//! Uploads to a Supabase-storage-style object endpoint
//! (`POST {base}/storage/v1/object/{bucket}/{key}`) and derives the public
//! URL from the bucket's public object path. The artifact is streamed from
//! disk rather than buffered in memory.

use async_trait::async_trait;
use reqwest::{Body, Client};
use std::path::Path;
use tokio_util::codec::{BytesCodec, FramedRead};

use crate::traits::{validate_key, ObjectPublisher, PublishError, PublishResult};

const VIDEO_CONTENT_TYPE: &str = "video/mp4";

#[derive(Clone)]
pub struct HttpBucket {
    client: Client,
    base_url: String,
    bucket: String,
    api_key: String,
}

impl HttpBucket {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
            api_key: api_key.into(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key)
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, key
        )
    }
}

#[async_trait]
impl ObjectPublisher for HttpBucket {
    async fn publish(&self, local_path: &Path, destination_key: &str) -> PublishResult<String> {
        validate_key(destination_key)?;

        let file = tokio::fs::File::open(local_path).await?;
        let size = file.metadata().await?.len();
        let stream = FramedRead::new(file, BytesCodec::new());

        let resp = self
            .client
            .post(self.object_url(destination_key))
            .bearer_auth(&self.api_key)
            .header("Content-Type", VIDEO_CONTENT_TYPE)
            .header("Content-Length", size)
            .header("x-upsert", "true")
            .body(Body::wrap_stream(stream))
            .send()
            .await
            .map_err(|e| PublishError::UploadFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PublishError::UploadFailed(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        tracing::info!(
            key = destination_key,
            bucket = %self.bucket,
            bytes = size,
            "Artifact published"
        );
        Ok(self.public_url(destination_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_bucket_scoped() {
        let bucket = HttpBucket::new(
            Client::new(),
            "https://store.example.com/",
            "generated-videos",
            "key",
        );
        assert_eq!(
            bucket.object_url("user_1/video-abc.mp4"),
            "https://store.example.com/storage/v1/object/generated-videos/user_1/video-abc.mp4"
        );
        assert_eq!(
            bucket.public_url("user_1/video-abc.mp4"),
            "https://store.example.com/storage/v1/object/public/generated-videos/user_1/video-abc.mp4"
        );
    }
}
