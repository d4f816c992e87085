//! quran.com v4 content API client.
//!
//! Verses and recitation files are paginated 50 per page. Audio file URLs are
//! relative to the audio host and joined onto `audio_base`.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::retry::{status_error, RetryPolicy};
use crate::traits::{AudioSource, VerseRecord, VerseSource};

pub const DEFAULT_API_BASE: &str = "https://api.quran.com/api/v4";
pub const DEFAULT_AUDIO_BASE: &str = "https://verses.quran.com/";

/// Ibn Kathir, abridged (Arabic).
pub const DEFAULT_TAFSIR_ID: u32 = 16;

const PAGE_SIZE: u32 = 50;

/// Commentary is capped to keep overlays short.
pub const COMMENTARY_MAX_CHARS: usize = 200;

/// Upper bound on pages followed for a single listing.
const MAX_PAGES: u32 = 100;

#[derive(Debug, Clone)]
pub struct QuranComConfig {
    pub api_base: String,
    pub audio_base: String,
    pub tafsir_id: u32,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for QuranComConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            audio_base: DEFAULT_AUDIO_BASE.to_string(),
            tafsir_id: DEFAULT_TAFSIR_ID,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    total_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct VerseDto {
    verse_number: u32,
    verse_key: String,
    #[serde(default)]
    text_uthmani: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersesPage {
    #[serde(default)]
    verses: Vec<VerseDto>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct AudioFileDto {
    verse_key: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct AudioFilesPage {
    #[serde(default)]
    audio_files: Vec<AudioFileDto>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
struct TafsirDto {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TafsirResponse {
    tafsir: Option<TafsirDto>,
}

fn total_pages(pagination: &Option<Pagination>) -> u32 {
    pagination
        .as_ref()
        .and_then(|p| p.total_pages)
        .unwrap_or(1)
        .clamp(1, MAX_PAGES)
}

/// Verse text, recitation audio and commentary from one content API.
#[derive(Debug, Clone)]
pub struct QuranComClient {
    client: reqwest::Client,
    api_base: String,
    audio_base: Url,
    tafsir_id: u32,
    retry: RetryPolicy,
    tag_pattern: Regex,
}

impl QuranComClient {
    pub fn new(config: QuranComConfig) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("vreel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: QuranComConfig) -> SourceResult<Self> {
        Url::parse(&config.api_base)
            .map_err(|e| SourceError::config(format!("invalid API base {}: {}", config.api_base, e)))?;

        let mut audio_base = config.audio_base.clone();
        if !audio_base.ends_with('/') {
            audio_base.push('/');
        }
        let audio_base = Url::parse(&audio_base)
            .map_err(|e| SourceError::config(format!("invalid audio base {}: {}", config.audio_base, e)))?;

        let tag_pattern =
            Regex::new(r"<[^>]*>").map_err(|e| SourceError::config(format!("tag pattern: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            audio_base,
            tafsir_id: config.tafsir_id,
            retry: config.retry,
            tag_pattern,
        })
    }

    async fn get_once<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> SourceResult<T> {
        let url = format!("{}{}", self.api_base, endpoint);
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, endpoint));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SourceError::Decode(format!("{}: {}", endpoint, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> SourceResult<T> {
        self.retry.run(endpoint, || self.get_once(endpoint, query)).await
    }

    /// Resolve a recitation file path against the audio host.
    fn absolute_audio_url(&self, raw: &str) -> SourceResult<String> {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(raw.to_string());
        }
        if let Some(rest) = raw.strip_prefix("//") {
            return Ok(format!("https://{}", rest));
        }
        self.audio_base
            .join(raw)
            .map(|u| u.to_string())
            .map_err(|e| SourceError::Decode(format!("audio url {}: {}", raw, e)))
    }

    /// Strip markup and cap the length. Blank text yields `None`.
    fn clean_commentary(&self, html: &str) -> Option<String> {
        let plain = self.tag_pattern.replace_all(html, "");
        let plain = plain.trim();
        if plain.is_empty() {
            return None;
        }
        Some(plain.chars().take(COMMENTARY_MAX_CHARS).collect())
    }
}

#[async_trait]
impl VerseSource for QuranComClient {
    async fn verses(&self, chapter: u32, from: u32, to: u32) -> SourceResult<Vec<VerseRecord>> {
        let endpoint = format!("/verses/by_chapter/{}", chapter);
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut page = 1u32;

        loop {
            let query = [
                ("language", "ar".to_string()),
                ("fields", "text_uthmani".to_string()),
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ];
            let body: VersesPage = self.get_json(&endpoint, &query).await?;

            let mut reached_end = false;
            for verse in body.verses {
                if verse.verse_number >= from && verse.verse_number <= to && seen.insert(verse.verse_key.clone()) {
                    records.push(VerseRecord {
                        verse_number: verse.verse_number,
                        verse_key: verse.verse_key,
                        text: verse.text_uthmani.unwrap_or_default(),
                    });
                }
                if verse.verse_number >= to {
                    reached_end = true;
                }
            }

            let pages = total_pages(&body.pagination);
            debug!(chapter, page, pages, collected = records.len(), "Fetched verse page");
            if reached_end || page >= pages {
                break;
            }
            page += 1;
        }

        if records.is_empty() {
            return Err(SourceError::empty(format!("verses {}:{}-{}", chapter, from, to)));
        }

        records.sort_by_key(|r| r.verse_number);
        info!(chapter, from, to, count = records.len(), "Fetched verses");
        Ok(records)
    }

    async fn commentary(&self, verse_key: &str) -> SourceResult<Option<String>> {
        let endpoint = format!("/tafsirs/{}/by_ayah/{}", self.tafsir_id, verse_key);
        let body: TafsirResponse = self.get_json(&endpoint, &[]).await?;

        Ok(body
            .tafsir
            .and_then(|t| t.text)
            .and_then(|text| self.clean_commentary(&text)))
    }
}

#[async_trait]
impl AudioSource for QuranComClient {
    async fn audio_urls(&self, reciter_id: u32, chapter: u32) -> SourceResult<HashMap<String, String>> {
        let endpoint = format!("/recitations/{}/by_chapter/{}", reciter_id, chapter);
        let mut urls = HashMap::new();
        let mut page = 1u32;

        loop {
            let query = [("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())];
            let body: AudioFilesPage = self.get_json(&endpoint, &query).await?;

            for file in body.audio_files {
                let url = self.absolute_audio_url(&file.url)?;
                urls.insert(file.verse_key, url);
            }

            if page >= total_pages(&body.pagination) {
                break;
            }
            page += 1;
        }

        if urls.is_empty() {
            return Err(SourceError::empty(format!(
                "audio for reciter {} chapter {}",
                reciter_id, chapter
            )));
        }

        info!(reciter_id, chapter, count = urls.len(), "Fetched recitation files");
        Ok(urls)
    }
}
