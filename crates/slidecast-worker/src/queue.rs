//! Job queue: bounded channel, consumer loop, and per-job cancellation.
//!
//! The acceptance boundary submits jobs; the consumer loop claims them and
//! spawns one orchestrator run each, bounded by a semaphore. At most one run
//! per job id is active at a time, enforced here by the active-id set.
//!
//! Shutdown: dropping every queue handle closes the channel; the consumer
//! exits after in-flight runs finish. There is no forced abort on shutdown;
//! use [`JobQueue::cancel`] per job when teardown must be prompt.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use slidecast_core::config::QueueConfig;
use slidecast_core::models::Job;

use crate::orchestrator::Orchestrator;

struct JobRequest {
    job: Job,
    cancel: CancellationToken,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("job {0} is already queued or running")]
    AlreadyActive(Uuid),

    #[error("queue is shut down")]
    Closed,
}

#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<JobRequest>,
    active: Arc<Mutex<HashMap<Uuid, CancellationToken>>>,
}

impl JobQueue {
    pub fn new(orchestrator: Arc<Orchestrator>, config: QueueConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<JobRequest>(config.channel_capacity);
        let active: Arc<Mutex<HashMap<Uuid, CancellationToken>>> = Arc::default();

        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        let consumer_active = active.clone();

        tokio::spawn(async move {
            tracing::info!(
                max_concurrent_jobs = config.max_concurrent_jobs,
                "Job queue consumer started"
            );

            while let Some(request) = rx.recv().await {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };

                let orchestrator = orchestrator.clone();
                let active = consumer_active.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let job_id = request.job.id;
                    orchestrator.run(request.job, request.cancel).await;
                    active.lock().await.remove(&job_id);
                });
            }

            tracing::info!("Job queue consumer stopped");
        });

        Self { tx, active }
    }

    /// Enqueue a job for processing. Rejects a job id that is already queued
    /// or running.
    pub async fn submit(&self, job: Job) -> Result<(), SubmitError> {
        let job_id = job.id;
        let cancel = CancellationToken::new();

        {
            let mut active = self.active.lock().await;
            if active.contains_key(&job_id) {
                return Err(SubmitError::AlreadyActive(job_id));
            }
            active.insert(job_id, cancel.clone());
        }

        if self.tx.send(JobRequest { job, cancel }).await.is_err() {
            self.active.lock().await.remove(&job_id);
            return Err(SubmitError::Closed);
        }

        tracing::info!(job_id = %job_id, "Job submitted to queue");
        Ok(())
    }

    /// Trip the job's cancellation token. Returns false when the job is not
    /// queued or running (already terminal, or unknown).
    pub async fn cancel(&self, job_id: Uuid) -> bool {
        match self.active.lock().await.get(&job_id) {
            Some(token) => {
                token.cancel();
                tracing::info!(job_id = %job_id, "Job cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Number of jobs queued or running.
    pub async fn active_jobs(&self) -> usize {
        self.active.lock().await.len()
    }
}
