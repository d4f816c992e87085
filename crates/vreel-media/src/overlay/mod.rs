//! Overlay program generation.
//!
//! A job renders its text either as a subtitle track burned in by a
//! shaping-capable engine, or as a chain of draw directives for engines
//! that only draw glyphs left to right. The mode is picked once per job.

pub mod ass;
pub mod drawtext;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vreel_models::{FontSelection, OverlaySegment};

use crate::error::{MediaError, MediaResult};
use crate::probe::EngineCapabilities;
use crate::timeline::Timeline;

pub use ass::SubtitleDocument;
pub use drawtext::DrawDirective;

/// Annotations longer than this are cut before wrapping.
pub const ANNOTATION_MAX_CHARS: usize = 120;
/// Extra visible characters per annotation line over the primary budget.
pub const ANNOTATION_EXTRA_BUDGET: usize = 10;
/// Maximum annotation lines per segment.
pub const ANNOTATION_MAX_LINES: usize = 2;
/// Label size relative to the primary text.
pub const LABEL_SIZE_RATIO: f64 = 0.45;
/// Annotation size relative to the primary text.
pub const ANNOTATION_SIZE_RATIO: f64 = 0.48;

/// Rendering backend for overlay text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Engine shapes and lays out bidirectional text itself.
    NativeShaping,
    /// Engine draws code points left to right; text is pre-shaped.
    Fallback,
}

impl BackendMode {
    /// Pick the backend from probed capabilities and operator preference.
    pub fn select(caps: &EngineCapabilities, preference: BackendPreference) -> MediaResult<Self> {
        match preference {
            BackendPreference::Auto if caps.supports_native_shaping() => Ok(Self::NativeShaping),
            BackendPreference::Auto | BackendPreference::Fallback => Ok(Self::Fallback),
            BackendPreference::Native if caps.supports_native_shaping() => Ok(Self::NativeShaping),
            BackendPreference::Native => Err(MediaError::UnsupportedBackend(
                "native shaping requested but the engine was built without libass".to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeShaping => "native_shaping",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for BackendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator override for backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    #[default]
    Auto,
    Native,
    Fallback,
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "native" => Ok(Self::Native),
            "fallback" | "drawtext" => Ok(Self::Fallback),
            other => Err(format!("unknown overlay backend: {other}")),
        }
    }
}

/// Frame and font parameters shared by both generators.
#[derive(Debug, Clone)]
pub struct OverlayContext {
    pub frame_width: u32,
    pub frame_height: u32,
    pub font: FontSelection,
    pub fonts_dir: PathBuf,
}

impl OverlayContext {
    pub fn new(frame_width: u32, frame_height: u32, font: FontSelection, fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            frame_width,
            frame_height,
            font,
            fonts_dir: fonts_dir.into(),
        }
    }

    /// Absolute path of the selected font file.
    pub fn font_path(&self) -> PathBuf {
        self.fonts_dir.join(self.font.file())
    }
}

/// Backend-specific text program, consumed once by the filter graph.
#[derive(Debug, Clone)]
pub enum OverlayProgram {
    Subtitles(SubtitleDocument),
    DrawText(Vec<DrawDirective>),
}

impl OverlayProgram {
    pub fn mode(&self) -> BackendMode {
        match self {
            Self::Subtitles(_) => BackendMode::NativeShaping,
            Self::DrawText(_) => BackendMode::Fallback,
        }
    }
}

/// Build the overlay program for all segments.
pub fn build_program(
    mode: BackendMode,
    segments: &[OverlaySegment],
    timeline: &Timeline,
    ctx: &OverlayContext,
) -> MediaResult<OverlayProgram> {
    if segments.len() != timeline.len() {
        return Err(MediaError::internal(format!(
            "{} segments but {} timeline entries",
            segments.len(),
            timeline.len()
        )));
    }

    Ok(match mode {
        BackendMode::NativeShaping => OverlayProgram::Subtitles(SubtitleDocument::build(segments, timeline, ctx)),
        BackendMode::Fallback => OverlayProgram::DrawText(drawtext::build_directives(segments, timeline, ctx)),
    })
}

/// Cut an annotation to [`ANNOTATION_MAX_CHARS`], marking the cut.
pub fn annotation_excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(ANNOTATION_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Ornate label for a segment, e.g. `﴿7﴾`.
pub fn segment_label(segment: &OverlaySegment) -> String {
    format!("\u{FD3F}{}\u{FD3E}", segment.label_number())
}
