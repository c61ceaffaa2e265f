//! Media engine invocation layer.
//!
//! Every stage that renders pixels goes through the external media engine
//! (ffmpeg/ffprobe) as a child process with a uniform invocation contract:
//! build an argument vector, spawn with captured stderr, interpret a non-zero
//! exit as failure carrying the diagnostic tail. [`FfmpegEngine`] implements
//! the [`RenderEngine`] seam the orchestrator drives; argument construction
//! lives in per-stage modules so it can be tested without an engine present.

pub mod clip;
pub mod command;
pub mod concat;
pub mod engine;
pub mod fetch;
pub mod mix;
pub mod overlay;
pub mod probe;

pub use engine::{FfmpegEngine, RenderEngine};
pub use fetch::{AssetFetcher, HttpFetcher};
