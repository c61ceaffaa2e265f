//! Slidecast Core Library
//!
//! This crate provides the domain models, stage error taxonomy, and typed
//! configuration shared across all Slidecast components.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{AppConfig, FetchConfig, PanDirection, QueueConfig, RenderConfig, StoreConfig};
pub use error::{EngineFailure, StageError, StageResult};
pub use models::{Job, JobStatus, JobUpdate, MAX_IMAGES};
