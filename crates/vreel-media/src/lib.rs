#![deny(unreachable_patterns)]
//! Render pipeline for narrated verse videos.
//!
//! This crate provides:
//! - Text preparation for connected scripts (normalization, contextual
//!   shaping, visual reordering, measurement and wrapping)
//! - Segment timelines with fade windows
//! - Overlay programs: ASS subtitle tracks or `drawtext` directive chains
//! - Type-safe FFmpeg command building with progress, timeout and cancellation
//! - The compositor state machine that turns a [`vreel_models::RenderJob`]
//!   into a finished file inside a self-cleaning scratch directory

pub mod command;
pub mod compositor;
pub mod download;
pub mod engine;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod metrics;
pub mod output;
pub mod overlay;
pub mod probe;
pub mod progress;
pub mod text;
pub mod timeline;
pub mod workdir;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use compositor::{Compositor, CompositorConfig, Stage};
pub use download::AssetDownloader;
pub use engine::{EncodeRequest, FfmpegEngine, RenderEngine};
pub use error::{MediaError, MediaResult};
pub use filters::{CompositeGraph, OverlayFilter};
pub use output::RenderOutput;
pub use overlay::{BackendMode, BackendPreference, DrawDirective, OverlayContext, OverlayProgram, SubtitleDocument};
pub use probe::{probe_capabilities, probe_duration, probe_media, EngineCapabilities, MediaInfo};
pub use progress::{FfmpegProgress, ProgressSink};
pub use timeline::{SegmentTiming, Timeline};
pub use workdir::{sweep_orphaned, ScratchDir};
