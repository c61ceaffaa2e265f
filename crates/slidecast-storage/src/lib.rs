//! Object publisher abstraction.
//!
//! The final rendered artifact is published to a blob store and referenced by
//! a public URL. [`ObjectPublisher`] is the seam the orchestrator uses;
//! backends are an HTTP bucket (Supabase-storage-style object endpoint) and a
//! local filesystem directory for development.

pub mod http;
pub mod local;
pub mod traits;

pub use http::HttpBucket;
pub use local::LocalBucket;
pub use traits::{ObjectPublisher, PublishError, PublishResult};
