//! Request-to-file pipeline.
//!
//! Validates a [`RenderRequest`], gathers verse text, narration and a
//! background from the collaborators, assembles overlay segments and hands
//! the resulting [`RenderJob`] to the compositor.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use vreel_media::{Compositor, ProgressSink, RenderOutput};
use vreel_models::{EncodingConfig, JobId, OverlaySegment, RenderJob, RenderRequest};
use vreel_sources::{AudioSource, BackgroundSource, SourceError, VerseSource};

use crate::error::{RenderError, RenderResult};
use crate::logging::JobLogger;
use crate::metrics;

pub struct RenderPipeline {
    verses: Arc<dyn VerseSource>,
    audio: Arc<dyn AudioSource>,
    background: Arc<dyn BackgroundSource>,
    compositor: Compositor,
    encoding: EncodingConfig,
}

impl RenderPipeline {
    pub fn new(
        verses: Arc<dyn VerseSource>,
        audio: Arc<dyn AudioSource>,
        background: Arc<dyn BackgroundSource>,
        compositor: Compositor,
    ) -> Self {
        Self {
            verses,
            audio,
            background,
            compositor,
            encoding: EncodingConfig::default(),
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Render a request. The returned output owns its scratch directory.
    pub async fn render(&self, request: &RenderRequest, progress: Option<ProgressSink>) -> RenderResult<RenderOutput> {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id, "render");
        let started = Instant::now();
        metrics::record_job_started();

        let result = self
            .run(request, job_id, &logger, progress)
            .instrument(logger.create_span())
            .await;

        match &result {
            Ok(output) => {
                metrics::record_job_completed(started.elapsed().as_secs_f64(), output.backend().as_str());
                logger.log_completion(&format!(
                    "{} ({:.1}s of video, {} backend)",
                    output.file_name(),
                    output.duration_secs(),
                    output.backend()
                ));
            }
            Err(e) => {
                metrics::record_job_failed(e.kind());
                logger.log_error(&e.diagnostic(&self.compositor.config().work_root));
            }
        }
        result
    }

    async fn run(
        &self,
        request: &RenderRequest,
        job_id: JobId,
        logger: &JobLogger,
        progress: Option<ProgressSink>,
    ) -> RenderResult<RenderOutput> {
        request.validate().map_err(RenderError::Validation)?;
        logger.log_start(&format!(
            "chapter {} verses {}-{} reciter {}",
            request.chapter, request.from, request.to, request.reciter_id
        ));

        let segments = self.assemble_segments(request, logger).await?;
        logger.log_progress(&format!("{} segments assembled", segments.len()));

        let background_url = self.background.background_url(request.theme).await?;

        let (width, height) = request.dimensions();
        let mut job = RenderJob::new(segments, background_url, width, height)
            .with_dim_opacity(request.dim_opacity)
            .with_font(request.font.clone())
            .with_encoding(self.encoding.clone())
            .with_output_name(request.output_file_name());
        job.id = job_id;

        Ok(self.compositor.render(&job, progress).await?)
    }

    /// One segment per verse, in verse order.
    async fn assemble_segments(&self, request: &RenderRequest, logger: &JobLogger) -> RenderResult<Vec<OverlaySegment>> {
        let verses = self.verses.verses(request.chapter, request.from, request.to).await?;
        let audio = self.audio.audio_urls(request.reciter_id, request.chapter).await?;

        let mut segments = Vec::with_capacity(verses.len());
        for verse in verses {
            let audio_url = audio
                .get(&verse.verse_key)
                .cloned()
                .ok_or_else(|| SourceError::MissingAudio(verse.verse_key.clone()))?;

            let mut segment = OverlaySegment::new(verse.text, verse.verse_key.clone(), audio_url);

            if request.include_tafsir {
                match self.verses.commentary(&verse.verse_key).await {
                    Ok(Some(text)) => segment = segment.with_annotation(text),
                    Ok(None) => {}
                    Err(e) => logger.log_warning(&format!("No commentary for {}: {}", verse.verse_key, e)),
                }
            }

            segments.push(segment);
        }

        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use vreel_media::{AssetDownloader, CompositorConfig, FfmpegEngine};
    use vreel_models::Theme;
    use vreel_sources::{SourceResult, VerseRecord};

    #[derive(Default)]
    struct FakeSources {
        calls: AtomicUsize,
        missing_audio: Option<&'static str>,
        commentary_fails: bool,
    }

    #[async_trait]
    impl VerseSource for FakeSources {
        async fn verses(&self, chapter: u32, from: u32, to: u32) -> SourceResult<Vec<VerseRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((from..=to)
                .map(|n| VerseRecord {
                    verse_number: n,
                    verse_key: format!("{}:{}", chapter, n),
                    text: format!("verse {}", n),
                })
                .collect())
        }

        async fn commentary(&self, verse_key: &str) -> SourceResult<Option<String>> {
            if self.commentary_fails {
                return Err(SourceError::Status {
                    status: 500,
                    endpoint: format!("/tafsirs/16/by_ayah/{}", verse_key),
                });
            }
            Ok(Some(format!("about {}", verse_key)))
        }
    }

    #[async_trait]
    impl AudioSource for FakeSources {
        async fn audio_urls(&self, _reciter_id: u32, chapter: u32) -> SourceResult<HashMap<String, String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((1..=10)
                .map(|n| format!("{}:{}", chapter, n))
                .filter(|key| Some(key.as_str()) != self.missing_audio)
                .map(|key| {
                    let url = format!("https://audio.example/{}.mp3", key);
                    (key, url)
                })
                .collect())
        }
    }

    #[async_trait]
    impl BackgroundSource for FakeSources {
        async fn background_url(&self, _theme: Theme) -> SourceResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("https://video.example/bg.mp4".to_string())
        }
    }

    fn pipeline(sources: Arc<FakeSources>, root: &TempDir) -> RenderPipeline {
        let compositor = Compositor::new(
            Arc::new(FfmpegEngine::default()),
            AssetDownloader::new(Duration::from_secs(1)).unwrap(),
            CompositorConfig {
                work_root: root.path().to_path_buf(),
                fonts_dir: root.path().join("fonts"),
                backend: Default::default(),
            },
        );
        RenderPipeline::new(sources.clone(), sources.clone(), sources, compositor)
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_any_call() {
        let root = TempDir::new().unwrap();
        let sources = Arc::new(FakeSources::default());
        let pipeline = pipeline(sources.clone(), &root);

        let err = pipeline
            .render(&RenderRequest::new(1, 1, 40, 7), None)
            .await
            .unwrap_err();

        assert!(matches!(err, RenderError::Validation(_)));
        assert_eq!(sources.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_segments_follow_verse_order() {
        let root = TempDir::new().unwrap();
        let sources = Arc::new(FakeSources::default());
        let pipeline = pipeline(sources, &root);
        let logger = JobLogger::new(&JobId::new(), "test");

        let segments = pipeline
            .assemble_segments(&RenderRequest::new(2, 3, 5, 7), &logger)
            .await
            .unwrap();

        let labels: Vec<_> = segments.iter().map(|s| s.source_label.as_str()).collect();
        assert_eq!(labels, vec!["2:3", "2:4", "2:5"]);
        assert_eq!(segments[1].audio_url, "https://audio.example/2:4.mp3");
        assert!(segments.iter().all(|s| s.annotation_text.is_none()));
    }

    #[tokio::test]
    async fn test_missing_narration_is_upstream_error() {
        let root = TempDir::new().unwrap();
        let sources = Arc::new(FakeSources {
            missing_audio: Some("1:2"),
            ..Default::default()
        });
        let pipeline = pipeline(sources, &root);
        let logger = JobLogger::new(&JobId::new(), "test");

        let err = pipeline
            .assemble_segments(&RenderRequest::new(1, 1, 3, 7), &logger)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "upstream_fetch");
        assert!(err.to_string().contains("1:2"));
    }

    #[tokio::test]
    async fn test_commentary_attached_when_requested() {
        let root = TempDir::new().unwrap();
        let pipeline = pipeline(Arc::new(FakeSources::default()), &root);
        let logger = JobLogger::new(&JobId::new(), "test");

        let mut request = RenderRequest::new(1, 1, 2, 7);
        request.include_tafsir = true;
        let segments = pipeline.assemble_segments(&request, &logger).await.unwrap();

        assert_eq!(segments[0].annotation_text.as_deref(), Some("about 1:1"));
    }

    #[tokio::test]
    async fn test_commentary_failure_degrades_to_none() {
        let root = TempDir::new().unwrap();
        let sources = Arc::new(FakeSources {
            commentary_fails: true,
            ..Default::default()
        });
        let pipeline = pipeline(sources, &root);
        let logger = JobLogger::new(&JobId::new(), "test");

        let mut request = RenderRequest::new(1, 1, 2, 7);
        request.include_tafsir = true;
        let segments = pipeline.assemble_segments(&request, &logger).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.annotation_text.is_none()));
    }
}
