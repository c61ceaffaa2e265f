//! In-memory job store for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use slidecast_core::models::{Job, JobUpdate};

use crate::traits::{JobStore, StoreError, StoreResult};

/// HashMap-backed store that enforces the status state machine on update.
#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored job, for test assertions.
    pub async fn all(&self) -> Vec<Job> {
        self.jobs.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create(&self, job: &Job) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get(&self, job_id: Uuid) -> StoreResult<Option<Job>> {
        Ok(self.jobs.read().await.get(&job_id).cloned())
    }

    async fn update(&self, update: JobUpdate) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&update.job_id)
            .ok_or(StoreError::NotFound(update.job_id))?;

        if !job.status.can_transition_to(update.status) {
            return Err(StoreError::InvalidTransition(format!(
                "{} -> {}",
                job.status, update.status
            )));
        }

        job.status = update.status;
        job.result_url = update.result_url;
        job.error_message = update.error_message;
        job.updated_at = update.updated_at;
        Ok(())
    }
}
