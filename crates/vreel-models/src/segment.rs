//! Narrated overlay segments.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Duration assumed when a narration file's length cannot be probed.
pub const DEFAULT_SEGMENT_DURATION_SECS: f64 = 5.0;

/// One narrated unit of the video: text on screen while its audio plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverlaySegment {
    /// Primary text (scripture verse)
    pub display_text: String,

    /// Optional commentary shown below the label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_text: Option<String>,

    /// Source key, e.g. "2:255"
    pub source_label: String,

    /// Remote narration asset
    pub audio_url: String,

    /// Absolute start (seconds), assigned by the timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    /// Absolute end (seconds), assigned by the timeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

impl OverlaySegment {
    pub fn new(
        display_text: impl Into<String>,
        source_label: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            display_text: display_text.into(),
            annotation_text: None,
            source_label: source_label.into(),
            audio_url: audio_url.into(),
            start: None,
            end: None,
        }
    }

    pub fn with_annotation(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.annotation_text = if text.trim().is_empty() { None } else { Some(text) };
        self
    }

    /// The part of the source label shown on screen: the verse number of
    /// "chapter:verse", or the whole label when it has no separator.
    pub fn label_number(&self) -> &str {
        match self.source_label.split_once(':') {
            Some((_, verse)) if !verse.is_empty() => verse,
            _ => &self.source_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_number() {
        let seg = OverlaySegment::new("text", "2:255", "a.mp3");
        assert_eq!(seg.label_number(), "255");
        let seg = OverlaySegment::new("text", "7", "a.mp3");
        assert_eq!(seg.label_number(), "7");
    }

    #[test]
    fn test_blank_annotation_dropped() {
        let seg = OverlaySegment::new("t", "1:1", "a.mp3").with_annotation("   ");
        assert!(seg.annotation_text.is_none());
    }
}
