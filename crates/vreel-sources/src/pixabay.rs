//! Pixabay video search for background footage.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;
use vreel_models::Theme;

use crate::error::{SourceError, SourceResult};
use crate::retry::{status_error, RetryPolicy};
use crate::traits::BackgroundSource;

pub const DEFAULT_API_BASE: &str = "https://pixabay.com/api/videos/";

const PER_PAGE: u32 = 20;

/// Editor's choice results are sampled from one of the first pages.
const MAX_RANDOM_PAGE: u32 = 3;

#[derive(Debug, Clone)]
pub struct PixabayConfig {
    pub api_base: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
}

impl PixabayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Rendition {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct Renditions {
    #[serde(default)]
    medium: Option<Rendition>,
    #[serde(default)]
    small: Option<Rendition>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    videos: Renditions,
}

impl Hit {
    /// Medium rendition, else small.
    fn playable_url(&self) -> Option<&str> {
        [&self.videos.medium, &self.videos.small]
            .into_iter()
            .flatten()
            .map(|r| r.url.as_str())
            .find(|url| !url.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

/// Query shape for one search attempt.
#[derive(Debug, Clone, Copy)]
enum SearchMode {
    /// Editor's choice nature films on a random early page
    Curated { page: u32 },
    /// Any popular film for the keywords
    Broad,
}

#[derive(Debug, Clone)]
pub struct PixabayClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    retry: RetryPolicy,
}

impl PixabayClient {
    pub fn new(config: PixabayConfig) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("vreel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: PixabayConfig) -> SourceResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(SourceError::config("PIXABAY_API_KEY is not set"));
        }
        Url::parse(&config.api_base)
            .map_err(|e| SourceError::config(format!("invalid API base {}: {}", config.api_base, e)))?;

        Ok(Self {
            client,
            api_base: config.api_base,
            api_key: config.api_key,
            retry: config.retry,
        })
    }

    fn query(&self, theme: Theme, mode: SearchMode) -> Vec<(&'static str, String)> {
        // Keywords are '+'-joined; the query encoder escapes a literal '+'
        let keywords = theme.search_keywords().replace('+', " ");

        let mut query = vec![
            ("key", self.api_key.clone()),
            ("q", keywords),
            ("video_type", "film".to_string()),
            ("safesearch", "true".to_string()),
            ("order", "popular".to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        if let SearchMode::Curated { page } = mode {
            query.push(("category", "nature".to_string()));
            query.push(("editors_choice", "true".to_string()));
            query.push(("page", page.to_string()));
        }
        query
    }

    async fn search_once(&self, query: &[(&'static str, String)]) -> SourceResult<Vec<Hit>> {
        let response = self.client.get(&self.api_base).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, "videos"));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(format!("videos: {}", e)))?;
        Ok(body.hits.into_iter().filter(|h| h.playable_url().is_some()).collect())
    }

    async fn search(&self, theme: Theme, mode: SearchMode) -> SourceResult<Vec<Hit>> {
        let query = self.query(theme, mode);
        self.retry.run("background_search", || self.search_once(&query)).await
    }
}

#[async_trait]
impl BackgroundSource for PixabayClient {
    async fn background_url(&self, theme: Theme) -> SourceResult<String> {
        let page = rand::rng().random_range(1..=MAX_RANDOM_PAGE);

        let mut hits = self.search(theme, SearchMode::Curated { page }).await?;
        if hits.is_empty() {
            warn!(theme = %theme.as_str(), page, "No curated backgrounds, broadening search");
            hits = self.search(theme, SearchMode::Broad).await?;
        }

        let pick = hits
            .choose(&mut rand::rng())
            .ok_or_else(|| SourceError::empty(format!("background videos for theme {}", theme.as_str())))?;

        let url = pick
            .playable_url()
            .ok_or_else(|| SourceError::empty("playable background rendition"))?
            .to_string();

        info!(theme = %theme.as_str(), video_id = pick.id, "Selected background video");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    struct WithoutParam(&'static str);

    impl Match for WithoutParam {
        fn matches(&self, request: &Request) -> bool {
            !request.url.query_pairs().any(|(k, _)| k == self.0)
        }
    }

    fn client_for(server: &MockServer) -> PixabayClient {
        PixabayClient::new(PixabayConfig {
            api_base: format!("{}/api/videos/", server.uri()),
            api_key: "test-key".to_string(),
            request_timeout: Duration::from_secs(5),
            retry: RetryPolicy::immediate(2),
        })
        .unwrap()
    }

    fn hit(id: u64, medium: &str, small: &str) -> serde_json::Value {
        json!({
            "id": id,
            "videos": {
                "medium": { "url": medium, "width": 1280, "height": 720 },
                "small": { "url": small, "width": 960, "height": 540 }
            }
        })
    }

    #[tokio::test]
    async fn test_curated_search_prefers_medium() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("key", "test-key"))
            .and(query_param("editors_choice", "true"))
            .and(query_param("q", "ocean waves aerial seascape -people -person -beach"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "hits": [hit(1, "https://cdn/m.mp4", "https://cdn/s.mp4")] })),
            )
            .mount(&server)
            .await;

        let url = client_for(&server).background_url(Theme::Ocean).await.unwrap();
        assert_eq!(url, "https://cdn/m.mp4");
    }

    #[tokio::test]
    async fn test_small_used_when_medium_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "hits": [hit(2, "", "https://cdn/s.mp4")] })),
            )
            .mount(&server)
            .await;

        let url = client_for(&server).background_url(Theme::Sky).await.unwrap();
        assert_eq!(url, "https://cdn/s.mp4");
    }

    #[tokio::test]
    async fn test_falls_back_to_broad_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("editors_choice", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": [] })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(WithoutParam("editors_choice"))
            .and(WithoutParam("page"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "hits": [hit(3, "https://cdn/b.mp4", "")] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = client_for(&server).background_url(Theme::Desert).await.unwrap();
        assert_eq!(url, "https://cdn/b.mp4");
        server.verify().await;
    }

    #[tokio::test]
    async fn test_no_results_is_empty_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server).background_url(Theme::Forest).await.unwrap_err();
        assert!(matches!(err, SourceError::Empty(_)));
    }

    #[test]
    fn test_missing_key_rejected() {
        let err = PixabayClient::new(PixabayConfig::new("  ")).unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
    }
}
