//! Render worker.
//!
//! This crate provides:
//! - Request validation and segment assembly from the content collaborators
//! - Compositor invocation and output delivery
//! - Caller-facing error reporting with redacted diagnostics
//! - Configuration from the environment, tracing setup and job metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{RenderError, RenderResult};
pub use logging::JobLogger;
pub use pipeline::RenderPipeline;
