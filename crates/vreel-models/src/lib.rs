//! Shared data models for the VerseReel render pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Render requests and their validation
//! - Render jobs and overlay segments
//! - Encoding configuration
//! - Fonts, frame presets and background themes

pub mod encoding;
pub mod font;
pub mod job;
pub mod request;
pub mod segment;
pub mod style;

// Re-export common types
pub use encoding::EncodingConfig;
pub use font::{FontCategory, FontEntry, FontSelection, FONT_CATALOG};
pub use job::{JobId, RenderJob};
pub use request::RenderRequest;
pub use segment::{OverlaySegment, DEFAULT_SEGMENT_DURATION_SECS};
pub use style::{AspectPreset, ParsePresetError, Theme};
