//! Slidecast worker: per-job workspace lifetime, the pipeline orchestrator,
//! and the in-process job queue.
//!
//! The queue is the swap point for a distributed dispatcher: the acceptance
//! boundary enqueues a job, the consumer loop spawns one orchestrator run per
//! job, and nothing in the orchestrator knows how it was scheduled.

pub mod orchestrator;
pub mod queue;
pub mod workspace;

pub use orchestrator::Orchestrator;
pub use queue::{JobQueue, SubmitError};
pub use workspace::Workspace;
