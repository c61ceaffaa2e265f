//! Job Store boundary.
//!
//! The durable record of job status lives in an external row store reached
//! over HTTP. This crate defines the [`JobStore`] trait the orchestrator
//! writes through, the [`HttpJobStore`] client for a PostgREST-style endpoint,
//! and an [`InMemoryJobStore`] used by tests and local development.
//!
//! The in-memory backend enforces the status state machine on update; the
//! HTTP backend trusts the caller (the orchestrator is the only writer).

pub mod http;
pub mod memory;
pub mod traits;

pub use http::HttpJobStore;
pub use memory::InMemoryJobStore;
pub use traits::{JobStore, StoreError, StoreResult};
