use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use slidecast_core::models::{Job, JobUpdate};

/// Job store operation errors. All variants are infrastructure-level: the
/// orchestrator logs them and continues rather than failing the job over a
/// bookkeeping write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Job not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable record of job status.
///
/// `create` is called by the acceptance boundary before the orchestrator
/// starts; `update` is called exactly once per status transition. Safe for
/// concurrent access across distinct job ids.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &Job) -> StoreResult<()>;

    async fn get(&self, job_id: Uuid) -> StoreResult<Option<Job>>;

    async fn update(&self, update: JobUpdate) -> StoreResult<()>;
}
