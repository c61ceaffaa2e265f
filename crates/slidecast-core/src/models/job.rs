use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Upper bound on source images per job. The acceptance boundary validates
/// this before a job is persisted; `Job::new` enforces it again.
pub const MAX_IMAGES: usize = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Uploading,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Single-direction state machine:
    /// pending → processing → uploading → completed, with failed reachable
    /// from every non-terminal state. Terminal states never re-enter.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Pending, JobStatus::Processing) => true,
            (JobStatus::Processing, JobStatus::Uploading) => true,
            (JobStatus::Uploading, JobStatus::Completed) => true,
            (JobStatus::Pending, JobStatus::Failed)
            | (JobStatus::Processing, JobStatus::Failed)
            | (JobStatus::Uploading, JobStatus::Failed) => true,
            _ => false,
        }
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Uploading => write!(f, "uploading"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "uploading" => Ok(JobStatus::Uploading),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// One user-submitted video-generation request and its tracked lifecycle.
///
/// Created in `pending` by the acceptance boundary, mutated exclusively by the
/// orchestrator, never deleted by this core. `result_url` is set iff the job
/// completed; `error_message` iff it failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub user_id: String,
    pub image_urls: Vec<String>,
    pub audio_url: String,
    pub status: JobStatus,
    pub result_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        user_id: impl Into<String>,
        image_urls: Vec<String>,
        audio_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        if image_urls.is_empty() {
            anyhow::bail!("job requires at least one image");
        }
        if image_urls.len() > MAX_IMAGES {
            anyhow::bail!(
                "job has {} images, maximum is {}",
                image_urls.len(),
                MAX_IMAGES
            );
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            image_urls,
            audio_url: audio_url.into(),
            status: JobStatus::Pending,
            result_url: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Short id used in workspace names and log prefixes.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

/// A single status transition to persist. One store write per transition;
/// `result_url` and `error_message` are only populated on the respective
/// terminal transitions.
#[derive(Debug, Clone, Serialize)]
pub struct JobUpdate {
    pub job_id: Uuid,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl JobUpdate {
    fn transition(job_id: Uuid, status: JobStatus) -> Self {
        Self {
            job_id,
            status,
            result_url: None,
            error_message: None,
            updated_at: Utc::now(),
        }
    }

    pub fn processing(job_id: Uuid) -> Self {
        Self::transition(job_id, JobStatus::Processing)
    }

    pub fn uploading(job_id: Uuid) -> Self {
        Self::transition(job_id, JobStatus::Uploading)
    }

    pub fn completed(job_id: Uuid, result_url: impl Into<String>) -> Self {
        Self {
            result_url: Some(result_url.into()),
            ..Self::transition(job_id, JobStatus::Completed)
        }
    }

    pub fn failed(job_id: Uuid, error_message: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_message.into()),
            ..Self::transition(job_id, JobStatus::Failed)
        }
    }
}
