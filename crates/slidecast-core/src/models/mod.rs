//! Domain models

pub mod job;

pub use job::{Job, JobStatus, JobUpdate, MAX_IMAGES};
