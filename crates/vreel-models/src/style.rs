//! Frame presets and background themes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Output aspect presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum AspectPreset {
    /// 16:9 landscape (YouTube)
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait (Reels / Shorts)
    #[serde(rename = "9:16")]
    Portrait,
    /// 1:1 square
    #[serde(rename = "1:1")]
    Square,
    /// 4:5 portrait feed
    #[serde(rename = "4:5")]
    Feed,
}

impl AspectPreset {
    /// Frame dimensions (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            AspectPreset::Landscape => (1280, 720),
            AspectPreset::Portrait => (720, 1280),
            AspectPreset::Square => (720, 720),
            AspectPreset::Feed => (576, 720),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectPreset::Landscape => "16:9",
            AspectPreset::Portrait => "9:16",
            AspectPreset::Square => "1:1",
            AspectPreset::Feed => "4:5",
        }
    }
}

impl fmt::Display for AspectPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error parsing a preset or theme name.
#[derive(Debug, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParsePresetError {
    kind: &'static str,
    value: String,
}

impl FromStr for AspectPreset {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16:9" => Ok(AspectPreset::Landscape),
            "9:16" => Ok(AspectPreset::Portrait),
            "1:1" => Ok(AspectPreset::Square),
            "4:5" => Ok(AspectPreset::Feed),
            other => Err(ParsePresetError {
                kind: "aspect preset",
                value: other.to_string(),
            }),
        }
    }
}

/// Background video theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Nature,
    Ocean,
    Sky,
    Desert,
    Forest,
}

impl Theme {
    pub const ALL: &'static [Theme] = &[
        Theme::Nature,
        Theme::Ocean,
        Theme::Sky,
        Theme::Desert,
        Theme::Forest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Nature => "nature",
            Theme::Ocean => "ocean",
            Theme::Sky => "sky",
            Theme::Desert => "desert",
            Theme::Forest => "forest",
        }
    }

    /// Search query for the background video source. People are excluded.
    pub fn search_keywords(&self) -> &'static str {
        match self {
            Theme::Nature => "nature+landscape+aerial+scenery+-people+-person+-woman+-man",
            Theme::Ocean => "ocean+waves+aerial+seascape+-people+-person+-beach",
            Theme::Sky => "sky+clouds+sunrise+timelapse+-people+-person",
            Theme::Desert => "desert+sand+dunes+aerial+landscape+-people+-person",
            Theme::Forest => "forest+trees+aerial+fog+landscape+-people+-person",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Theme::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or(ParsePresetError {
                kind: "theme",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_dimensions() {
        assert_eq!(AspectPreset::Landscape.dimensions(), (1280, 720));
        assert_eq!(AspectPreset::Feed.dimensions(), (576, 720));
        assert_eq!("9:16".parse::<AspectPreset>().unwrap(), AspectPreset::Portrait);
        assert!("21:9".parse::<AspectPreset>().is_err());
    }

    #[test]
    fn test_theme_parse() {
        assert_eq!("Ocean".parse::<Theme>().unwrap(), Theme::Ocean);
        assert!("city".parse::<Theme>().is_err());
    }

    #[test]
    fn test_aspect_serde() {
        let json = serde_json::to_string(&AspectPreset::Square).unwrap();
        assert_eq!(json, "\"1:1\"");
    }
}
