//! Caller-facing render request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{AspectPreset, FontSelection, Theme};

/// Number of chapters in the text corpus.
pub const MAX_CHAPTER: u32 = 114;

/// Maximum span `to - from` of one video.
pub const MAX_VERSE_SPAN: u32 = 30;

/// Largest accepted frame edge in pixels.
pub const MAX_FRAME_EDGE: u32 = 3840;

fn default_dim_opacity() -> f64 {
    0.5
}

/// A request to render verses `from..=to` of `chapter`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderRequest {
    pub chapter: u32,
    pub from: u32,
    pub to: u32,
    pub reciter_id: u32,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub include_tafsir: bool,

    #[serde(default = "default_dim_opacity")]
    pub dim_opacity: f64,

    /// Explicit frame size; overrides `aspect` when both are set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_size: Option<(u32, u32)>,

    #[serde(default)]
    pub aspect: AspectPreset,

    #[serde(default)]
    pub font: FontSelection,
}

impl RenderRequest {
    pub fn new(chapter: u32, from: u32, to: u32, reciter_id: u32) -> Self {
        Self {
            chapter,
            from,
            to,
            reciter_id,
            theme: Theme::default(),
            include_tafsir: false,
            dim_opacity: default_dim_opacity(),
            frame_size: None,
            aspect: AspectPreset::default(),
            font: FontSelection::default(),
        }
    }

    /// Output frame dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        self.frame_size.unwrap_or_else(|| self.aspect.dimensions())
    }

    /// Deterministic name of the delivered file.
    pub fn output_file_name(&self) -> String {
        format!("quran_{}_{}-{}.mp4", self.chapter, self.from, self.to)
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), String> {
        if self.chapter == 0 || self.from == 0 || self.to == 0 || self.reciter_id == 0 {
            return Err("Missing required fields".to_string());
        }

        if self.chapter > MAX_CHAPTER {
            return Err(format!("Chapter must be between 1 and {}", MAX_CHAPTER));
        }

        if self.to < self.from {
            return Err("Range end must not precede range start".to_string());
        }

        if self.to - self.from > MAX_VERSE_SPAN {
            return Err(format!("Maximum {} verses per video", MAX_VERSE_SPAN));
        }

        if !(0.0..=1.0).contains(&self.dim_opacity) {
            return Err("Dim opacity must be between 0 and 1".to_string());
        }

        let (width, height) = self.dimensions();
        for edge in [width, height] {
            if edge == 0 || edge > MAX_FRAME_EDGE {
                return Err(format!("Frame dimensions must be between 1 and {}", MAX_FRAME_EDGE));
            }
            if edge % 2 != 0 {
                return Err("Frame dimensions must be even".to_string());
            }
        }

        if !self.font.is_known() {
            return Err(format!("Unknown font: {}", self.font.file()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let request = RenderRequest::new(1, 1, 7, 7);
        assert!(request.validate().is_ok());
        assert_eq!(request.output_file_name(), "quran_1_1-7.mp4");
        assert_eq!(request.dimensions(), (1280, 720));
    }

    #[test]
    fn test_missing_fields_rejected() {
        assert!(RenderRequest::new(0, 1, 7, 7).validate().is_err());
        assert!(RenderRequest::new(1, 1, 7, 0).validate().is_err());
    }

    #[test]
    fn test_span_limit() {
        assert!(RenderRequest::new(2, 1, 31, 7).validate().is_ok());
        let err = RenderRequest::new(2, 1, 32, 7).validate().unwrap_err();
        assert!(err.contains("30"));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(RenderRequest::new(2, 10, 5, 7).validate().is_err());
    }

    #[test]
    fn test_out_of_range_parameters() {
        let mut request = RenderRequest::new(115, 1, 2, 7);
        assert!(request.validate().is_err());

        request.chapter = 1;
        request.dim_opacity = 1.5;
        assert!(request.validate().is_err());

        request.dim_opacity = 0.2;
        request.frame_size = Some((1281, 720));
        assert!(request.validate().is_err());

        request.frame_size = None;
        request.font = FontSelection::new("Comic.ttf");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let request: RenderRequest =
            serde_json::from_str(r#"{"chapter":1,"from":1,"to":3,"reciter_id":7}"#).unwrap();
        assert_eq!(request.dim_opacity, 0.5);
        assert_eq!(request.theme, Theme::Nature);
        assert_eq!(request.font.file(), "Amiri.ttf");
    }
}
