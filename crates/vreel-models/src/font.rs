//! Selectable overlay fonts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Calligraphic family of a font, used for grouping in pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FontCategory {
    Naskh,
    Ruqaa,
    Modern,
}

/// A font that can be burned into the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontEntry {
    /// Stable identifier
    pub id: &'static str,
    /// File name under the fonts directory
    pub file: &'static str,
    /// Calligraphic family
    pub category: FontCategory,
    /// Whether the font carries Arabic presentation-form glyphs (U+FB50..U+FEFF)
    pub has_presentation_forms: bool,
}

/// Every font shipped in the fonts directory.
pub const FONT_CATALOG: &[FontEntry] = &[
    FontEntry { id: "amiri", file: "Amiri.ttf", category: FontCategory::Naskh, has_presentation_forms: true },
    FontEntry { id: "amiri-bold", file: "Amiri-Bold.ttf", category: FontCategory::Naskh, has_presentation_forms: true },
    FontEntry { id: "noto-naskh", file: "NotoNaskhArabic.ttf", category: FontCategory::Naskh, has_presentation_forms: true },
    FontEntry { id: "aref-ruqaa", file: "ArefRuqaa.ttf", category: FontCategory::Ruqaa, has_presentation_forms: false },
    FontEntry { id: "aref-ruqaa-bold", file: "ArefRuqaa-Bold.ttf", category: FontCategory::Ruqaa, has_presentation_forms: false },
    FontEntry { id: "cairo", file: "Cairo.ttf", category: FontCategory::Modern, has_presentation_forms: false },
    FontEntry { id: "tajawal", file: "Tajawal.ttf", category: FontCategory::Modern, has_presentation_forms: false },
    FontEntry { id: "tajawal-bold", file: "Tajawal-Bold.ttf", category: FontCategory::Modern, has_presentation_forms: false },
    FontEntry { id: "almarai", file: "Almarai.ttf", category: FontCategory::Modern, has_presentation_forms: false },
    FontEntry { id: "lemonada", file: "Lemonada.ttf", category: FontCategory::Modern, has_presentation_forms: false },
];

/// Default font file.
pub const DEFAULT_FONT_FILE: &str = "Amiri.ttf";

/// The font chosen for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FontSelection(pub String);

impl FontSelection {
    pub fn new(file: impl Into<String>) -> Self {
        Self(file.into())
    }

    /// File name under the fonts directory.
    pub fn file(&self) -> &str {
        &self.0
    }

    /// Catalog entry, if the file is a known font.
    pub fn entry(&self) -> Option<&'static FontEntry> {
        FONT_CATALOG.iter().find(|f| f.file == self.0)
    }

    pub fn is_known(&self) -> bool {
        self.entry().is_some()
    }

    /// Family name used in subtitle style lines: the file stem with dashes as spaces.
    pub fn family_name(&self) -> String {
        let stem = match self.0.rsplit_once('.') {
            Some((stem, ext)) if matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "woff" | "woff2") => stem,
            _ => self.0.as_str(),
        };
        stem.replace('-', " ")
    }
}

impl Default for FontSelection {
    fn default() -> Self {
        Self(DEFAULT_FONT_FILE.to_string())
    }
}
