//! Render job definitions.

use schemars::JsonSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{EncodingConfig, FontSelection, OverlaySegment};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything the compositor needs to render one video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderJob {
    /// Unique job ID
    pub id: JobId,

    /// Narrated segments in playback order
    pub segments: Vec<OverlaySegment>,

    /// Remote background video
    pub background_url: String,

    /// Opacity of the black dimming layer (0.0 to 1.0)
    pub dim_opacity: f64,

    /// Output frame width in pixels
    pub frame_width: u32,

    /// Output frame height in pixels
    pub frame_height: u32,

    /// Overlay font
    #[serde(default)]
    pub font: FontSelection,

    /// Encoder settings
    #[serde(default)]
    pub encoding: EncodingConfig,

    /// Deterministic name of the delivered file
    pub output_name: String,

    /// When the job was assembled
    pub created_at: DateTime<Utc>,
}

impl RenderJob {
    pub fn new(
        segments: Vec<OverlaySegment>,
        background_url: impl Into<String>,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            id: JobId::new(),
            segments,
            background_url: background_url.into(),
            dim_opacity: 0.5,
            frame_width,
            frame_height,
            font: FontSelection::default(),
            encoding: EncodingConfig::default(),
            output_name: "output.mp4".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_dim_opacity(mut self, opacity: f64) -> Self {
        self.dim_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_font(mut self, font: FontSelection) -> Self {
        self.font = font;
        self
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    /// Dim opacity clamped into [0, 1].
    pub fn clamped_dim_opacity(&self) -> f64 {
        if self.dim_opacity.is_nan() {
            return 0.0;
        }
        self.dim_opacity.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn test_dim_opacity_clamped() {
        let job = RenderJob::new(Vec::new(), "bg.mp4", 1280, 720).with_dim_opacity(1.7);
        assert_eq!(job.dim_opacity, 1.0);

        let mut job = RenderJob::new(Vec::new(), "bg.mp4", 1280, 720);
        job.dim_opacity = -0.3;
        assert_eq!(job.clamped_dim_opacity(), 0.0);
    }
}
