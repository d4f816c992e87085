//! Collaborator contracts used by the worker.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vreel_models::Theme;

use crate::error::SourceResult;

/// One verse of the requested range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    /// Number within its chapter
    pub verse_number: u32,
    /// Unique key, e.g. "2:255"
    pub verse_key: String,
    pub text: String,
}

/// Ordered verse text and per-verse commentary.
#[async_trait]
pub trait VerseSource: Send + Sync {
    /// Verses `from..=to` of `chapter`, in order, each key at most once.
    async fn verses(&self, chapter: u32, from: u32, to: u32) -> SourceResult<Vec<VerseRecord>>;

    /// Plain-text commentary for a verse, `None` when there is none.
    async fn commentary(&self, verse_key: &str) -> SourceResult<Option<String>>;
}

/// Narration assets for a reciter.
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Absolute audio URL per verse key of `chapter`.
    async fn audio_urls(&self, reciter_id: u32, chapter: u32) -> SourceResult<HashMap<String, String>>;
}

/// Background footage search.
#[async_trait]
pub trait BackgroundSource: Send + Sync {
    /// URL of a playable video matching `theme`.
    async fn background_url(&self, theme: Theme) -> SourceResult<String>;
}
