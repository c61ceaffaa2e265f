//! HTTP job store client.
//!
//! Talks to a PostgREST-style row store (`/rest/v1/{table}`) with key-based
//! auth headers. The `reqwest::Client` is constructed once at startup and
//! injected; this type only holds a cheap clone of it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use slidecast_core::models::{Job, JobStatus, JobUpdate};

use crate::traits::{JobStore, StoreError, StoreResult};

const JOBS_TABLE: &str = "jobs";

#[derive(Clone)]
pub struct HttpJobStore {
    client: Client,
    base_url: String,
    api_key: String,
}

/// PATCH body for a status transition. `job_id` is addressed in the query
/// string, not the payload; absent optionals are omitted so they do not
/// overwrite existing columns.
#[derive(Serialize)]
struct TransitionBody<'a> {
    status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    result_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

impl HttpJobStore {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, JOBS_TABLE)
    }

    fn row_url(&self, job_id: Uuid) -> String {
        format!("{}?id=eq.{}", self.table_url(), job_id)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(resp: reqwest::Response) -> StoreResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl JobStore for HttpJobStore {
    async fn create(&self, job: &Job) -> StoreResult<()> {
        let resp = self
            .authed(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(job)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> StoreResult<Option<Job>> {
        let resp = self
            .authed(self.client.get(self.row_url(job_id)))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let resp = Self::check(resp).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let mut rows: Vec<Job> = serde_json::from_str(&body)?;
        Ok(rows.pop())
    }

    async fn update(&self, update: JobUpdate) -> StoreResult<()> {
        let body = TransitionBody {
            status: update.status,
            result_url: update.result_url.as_deref(),
            error_message: update.error_message.as_deref(),
            updated_at: update.updated_at,
        };

        let resp = self
            .authed(self.client.patch(self.row_url(update.job_id)))
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Self::check(resp).await?;

        tracing::debug!(job_id = %update.job_id, status = %update.status, "Job record updated");
        Ok(())
    }
}
