//! The render state machine.
//!
//! A job moves through a fixed sequence of stages:
//!
//! ```text
//! Init -> DownloadBackground -> DownloadAudio(0..n) -> ConcatAudio
//!      -> BuildOverlayProgram -> BuildFilterGraph -> Encode -> Done
//! ```
//!
//! Each stage has one transition function. The first failing stage aborts
//! the job; the scratch directory is removed before the error is returned.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use vreel_models::{OverlaySegment, RenderJob, DEFAULT_SEGMENT_DURATION_SECS};

use crate::download::AssetDownloader;
use crate::engine::{EncodeRequest, RenderEngine};
use crate::error::{MediaError, MediaResult};
use crate::filters::{CompositeGraph, OverlayFilter};
use crate::metrics;
use crate::output::RenderOutput;
use crate::overlay::{self, BackendMode, BackendPreference, OverlayContext, OverlayProgram};
use crate::progress::ProgressSink;
use crate::timeline::Timeline;
use crate::workdir::ScratchDir;

const BACKGROUND_FILE: &str = "background.mp4";
const AUDIO_LIST_FILE: &str = "audio_list.txt";
const MERGED_AUDIO_FILE: &str = "merged_audio.mp3";
const SUBTITLES_FILE: &str = "subs.ass";
const FILTER_SCRIPT_FILE: &str = "filters.txt";
const OUTPUT_FILE: &str = "output.mp4";

/// Pipeline position of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    DownloadBackground,
    /// Fetch and probe the narration of segment `n`
    DownloadAudio(usize),
    ConcatAudio,
    BuildOverlayProgram,
    BuildFilterGraph,
    Encode,
    Done,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::DownloadBackground => "download_background",
            Self::DownloadAudio(_) => "download_audio",
            Self::ConcatAudio => "concat_audio",
            Self::BuildOverlayProgram => "build_overlay_program",
            Self::BuildFilterGraph => "build_filter_graph",
            Self::Encode => "encode",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DownloadAudio(i) => write!(f, "download_audio[{i}]"),
            other => f.write_str(other.name()),
        }
    }
}

/// Paths and policy shared by all jobs.
#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Parent of every job's scratch directory
    pub work_root: PathBuf,
    /// Directory holding the font catalog files
    pub fonts_dir: PathBuf,
    pub backend: BackendPreference,
}

/// Drives a [`RenderEngine`] through the stages of one job.
pub struct Compositor {
    engine: Arc<dyn RenderEngine>,
    downloader: AssetDownloader,
    config: CompositorConfig,
    cancel: Option<watch::Receiver<bool>>,
}

/// Everything produced so far by a running job.
struct JobRun<'a> {
    job: &'a RenderJob,
    scratch: ScratchDir,
    mode: Option<BackendMode>,
    background: Option<PathBuf>,
    audio_files: Vec<PathBuf>,
    durations: Vec<f64>,
    merged_audio: Option<PathBuf>,
    timeline: Option<Timeline>,
    segments: Vec<OverlaySegment>,
    program: Option<OverlayProgram>,
    filter_script: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl<'a> JobRun<'a> {
    fn new(job: &'a RenderJob, scratch: ScratchDir) -> Self {
        Self {
            job,
            scratch,
            mode: None,
            background: None,
            audio_files: Vec::with_capacity(job.segments.len()),
            durations: Vec::with_capacity(job.segments.len()),
            merged_audio: None,
            timeline: None,
            segments: Vec::new(),
            program: None,
            filter_script: None,
            output: None,
        }
    }

    fn overlay_context(&self, fonts_dir: &Path) -> OverlayContext {
        OverlayContext::new(
            self.job.frame_width,
            self.job.frame_height,
            self.job.font.clone(),
            fonts_dir,
        )
    }
}

fn require<'v, T>(value: &'v Option<T>, what: &str) -> MediaResult<&'v T> {
    value
        .as_ref()
        .ok_or_else(|| MediaError::internal(format!("{what} missing at this stage")))
}

/// One `file '...'` line of a concat-demuxer list.
fn concat_list_line(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/").replace('\'', "'\\''");
    format!("file '{path}'")
}

impl Compositor {
    pub fn new(engine: Arc<dyn RenderEngine>, downloader: AssetDownloader, config: CompositorConfig) -> Self {
        Self {
            engine,
            downloader,
            config,
            cancel: None,
        }
    }

    /// Abort between stages and during the encode once `cancel` turns `true`.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Render a job. On success the returned output owns the scratch directory.
    pub async fn render(&self, job: &RenderJob, progress: Option<ProgressSink>) -> MediaResult<RenderOutput> {
        if job.segments.is_empty() {
            return Err(MediaError::InvalidJob("job has no segments".to_string()));
        }
        if job.frame_width == 0 || job.frame_height == 0 {
            return Err(MediaError::InvalidJob(format!(
                "invalid frame size {}x{}",
                job.frame_width, job.frame_height
            )));
        }

        let scratch = ScratchDir::create(&self.config.work_root)?;
        let mut run = JobRun::new(job, scratch);
        let mut stage = Stage::Init;

        while stage != Stage::Done {
            if self.is_cancelled() {
                warn!(job_id = %job.id, stage = %stage, "Job cancelled");
                return Err(self.abort(run, stage, MediaError::Cancelled));
            }

            debug!(job_id = %job.id, stage = %stage, "Entering stage");
            let started = Instant::now();

            let next = match stage {
                Stage::Init => self.init(&mut run).await,
                Stage::DownloadBackground => self.download_background(&mut run).await,
                Stage::DownloadAudio(index) => self.download_audio(&mut run, index).await,
                Stage::ConcatAudio => self.concat_audio(&mut run).await,
                Stage::BuildOverlayProgram => self.build_overlay_program(&mut run).await,
                Stage::BuildFilterGraph => self.build_filter_graph(&mut run).await,
                Stage::Encode => self.encode(&mut run, progress.clone()).await,
                Stage::Done => Ok(Stage::Done),
            };

            metrics::record_stage(stage.name(), started.elapsed().as_secs_f64());

            match next {
                Ok(next) => {
                    info!(
                        job_id = %job.id,
                        stage = %stage,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Stage complete"
                    );
                    stage = next;
                }
                Err(e) => return Err(self.abort(run, stage, e)),
            }
        }

        self.finish(run)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Tear down the scratch directory, then hand back the error.
    fn abort(&self, run: JobRun<'_>, stage: Stage, error: MediaError) -> MediaError {
        warn!(job_id = %run.job.id, stage = %stage, error = %error, "Render failed, removing scratch directory");
        metrics::record_stage_failure(stage.name());
        if let Err(cleanup) = run.scratch.close() {
            warn!(job_id = %run.job.id, error = %cleanup, "Failed to remove scratch directory");
        }
        error
    }

    fn finish(&self, run: JobRun<'_>) -> MediaResult<RenderOutput> {
        let output = require(&run.output, "output")?.clone();
        let mode = *require(&run.mode, "backend mode")?;
        let duration = require(&run.timeline, "timeline")?.capped_duration(run.job.encoding.max_duration_secs);
        Ok(RenderOutput::new(
            run.scratch,
            output,
            run.job.output_name.clone(),
            duration,
            mode,
            run.segments,
        ))
    }

    async fn init(&self, run: &mut JobRun<'_>) -> MediaResult<Stage> {
        let caps = self.engine.capabilities().await?;
        let mode = BackendMode::select(&caps, self.config.backend)?;
        metrics::record_backend(mode.as_str());

        let ctx = run.overlay_context(&self.config.fonts_dir);
        if !ctx.font_path().exists() {
            warn!(font = %ctx.font_path().display(), "Font file not found, the engine may substitute another");
        }
        if mode == BackendMode::Fallback && run.job.font.entry().is_some_and(|f| !f.has_presentation_forms) {
            warn!(font = %run.job.font.file(), "Font lacks presentation forms, shaped glyphs may render as boxes");
        }

        info!(
            job_id = %run.job.id,
            backend = %mode,
            segments = run.job.segments.len(),
            width = run.job.frame_width,
            height = run.job.frame_height,
            created_at = %run.job.created_at,
            "Render job initialised"
        );
        run.mode = Some(mode);
        Ok(Stage::DownloadBackground)
    }

    async fn download_background(&self, run: &mut JobRun<'_>) -> MediaResult<Stage> {
        let dest = run.scratch.join(BACKGROUND_FILE);
        let bytes = self.downloader.download(&run.job.background_url, &dest).await?;
        metrics::record_asset_bytes("background", bytes);
        run.background = Some(dest);
        Ok(Stage::DownloadAudio(0))
    }

    async fn download_audio(&self, run: &mut JobRun<'_>, index: usize) -> MediaResult<Stage> {
        let segment = run
            .job
            .segments
            .get(index)
            .ok_or_else(|| MediaError::internal(format!("no segment at index {index}")))?;

        let dest = run.scratch.join(format!("audio_{index}.mp3"));
        let bytes = self.downloader.download(&segment.audio_url, &dest).await?;
        metrics::record_asset_bytes("audio", bytes);

        let duration = match self.engine.probe_duration(&dest).await {
            Ok(d) if d.is_finite() && d > 0.0 => d,
            Ok(d) => {
                warn!(index, duration = d, "Unusable audio duration, using default");
                DEFAULT_SEGMENT_DURATION_SECS
            }
            Err(e) => {
                warn!(index, error = %e, "Audio duration probe failed, using default");
                DEFAULT_SEGMENT_DURATION_SECS
            }
        };
        debug!(index, duration, "Probed narration");

        run.audio_files.push(dest);
        run.durations.push(duration);

        if index + 1 < run.job.segments.len() {
            Ok(Stage::DownloadAudio(index + 1))
        } else {
            Ok(Stage::ConcatAudio)
        }
    }

    async fn concat_audio(&self, run: &mut JobRun<'_>) -> MediaResult<Stage> {
        if run.audio_files.len() != run.job.segments.len() {
            return Err(MediaError::internal("audio downloads incomplete"));
        }

        let list = run.scratch.join(AUDIO_LIST_FILE);
        let content = run
            .audio_files
            .iter()
            .map(|p| concat_list_line(p))
            .collect::<Vec<_>>()
            .join("\n");
        tokio::fs::write(&list, content).await?;

        let merged = run.scratch.join(MERGED_AUDIO_FILE);
        self.engine.concat_audio(&list, &merged).await?;
        run.merged_audio = Some(merged);
        Ok(Stage::BuildOverlayProgram)
    }

    async fn build_overlay_program(&self, run: &mut JobRun<'_>) -> MediaResult<Stage> {
        let mode = *require(&run.mode, "backend mode")?;
        let timeline = Timeline::from_durations(&run.durations, DEFAULT_SEGMENT_DURATION_SECS);

        run.segments = run
            .job
            .segments
            .iter()
            .zip(timeline.segments())
            .map(|(segment, timing)| {
                let mut segment = segment.clone();
                segment.start = Some(timing.start);
                segment.end = Some(timing.end);
                segment
            })
            .collect();

        let ctx = run.overlay_context(&self.config.fonts_dir);
        let program = overlay::build_program(mode, &run.segments, &timeline, &ctx)?;

        if let OverlayProgram::Subtitles(doc) = &program {
            doc.write_to(run.scratch.join(SUBTITLES_FILE)).await?;
        }

        info!(
            job_id = %run.job.id,
            total_secs = timeline.total_duration(),
            backend = %program.mode(),
            "Overlay program built"
        );
        run.timeline = Some(timeline);
        run.program = Some(program);
        Ok(Stage::BuildFilterGraph)
    }

    async fn build_filter_graph(&self, run: &mut JobRun<'_>) -> MediaResult<Stage> {
        let timeline = require(&run.timeline, "timeline")?;
        let program = run
            .program
            .take()
            .ok_or_else(|| MediaError::internal("overlay program missing at this stage"))?;
        let ctx = run.overlay_context(&self.config.fonts_dir);

        let overlay = match program {
            OverlayProgram::Subtitles(_) => OverlayFilter::Subtitles {
                script: run.scratch.join(SUBTITLES_FILE),
                fonts_dir: self.config.fonts_dir.clone(),
            },
            OverlayProgram::DrawText(directives) => OverlayFilter::DrawText {
                directives,
                font_file: ctx.font_path(),
            },
        };

        let graph = CompositeGraph {
            duration_secs: timeline.capped_duration(run.job.encoding.max_duration_secs),
            frame_rate: run.job.encoding.frame_rate,
            width: run.job.frame_width,
            height: run.job.frame_height,
            dim_opacity: run.job.clamped_dim_opacity(),
            overlay,
        };

        let script = run.scratch.join(FILTER_SCRIPT_FILE);
        graph.write_to(&script).await?;
        run.filter_script = Some(script);
        Ok(Stage::Encode)
    }

    async fn encode(&self, run: &mut JobRun<'_>, progress: Option<ProgressSink>) -> MediaResult<Stage> {
        let output = run.scratch.join(OUTPUT_FILE);
        let request = EncodeRequest {
            background: require(&run.background, "background")?.clone(),
            audio: require(&run.merged_audio, "merged audio")?.clone(),
            filter_script: require(&run.filter_script, "filter script")?.clone(),
            output: output.clone(),
            duration_secs: require(&run.timeline, "timeline")?.capped_duration(run.job.encoding.max_duration_secs),
            encoding: run.job.encoding.clone(),
            cancel: self.cancel.clone(),
        };

        self.engine.encode(&request, progress).await?;

        if !output.exists() {
            return Err(MediaError::ffmpeg_failed("encode produced no output file", None, None));
        }
        run.output = Some(output);
        Ok(Stage::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::EngineCapabilities;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Engine double: durations by segment index, records the filter graph.
    #[derive(Default)]
    struct FakeEngine {
        libass: bool,
        durations: Vec<f64>,
        fail_encode: bool,
        filter_graph: Mutex<Option<String>>,
        concat_list: Mutex<Option<String>>,
    }

    #[async_trait]
    impl RenderEngine for FakeEngine {
        async fn capabilities(&self) -> MediaResult<EngineCapabilities> {
            Ok(EngineCapabilities {
                libass: self.libass,
                freetype: true,
                ..Default::default()
            })
        }

        async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
            let index: usize = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_prefix("audio_"))
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| MediaError::internal("unexpected probe path"))?;
            self.durations
                .get(index)
                .copied()
                .ok_or_else(|| MediaError::InvalidVideo("no duration".into()))
        }

        async fn concat_audio(&self, list_file: &Path, output: &Path) -> MediaResult<()> {
            *self.concat_list.lock().unwrap() = Some(tokio::fs::read_to_string(list_file).await?);
            tokio::fs::write(output, b"merged").await?;
            Ok(())
        }

        async fn encode(&self, request: &EncodeRequest, progress: Option<ProgressSink>) -> MediaResult<()> {
            *self.filter_graph.lock().unwrap() = Some(tokio::fs::read_to_string(&request.filter_script).await?);
            if self.fail_encode {
                return Err(MediaError::ffmpeg_failed(
                    "FFmpeg exited with non-zero status",
                    Some("No such filter: 'drawtext'".into()),
                    Some(1),
                ));
            }
            if let Some(sink) = progress {
                sink(50);
                sink(100);
            }
            tokio::fs::write(&request.output, b"fake mp4").await?;
            Ok(())
        }
    }

    async fn asset_server(failing_audio: Option<usize>) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bg.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 512]))
            .mount(&server)
            .await;
        for i in 0..3 {
            let status = if failing_audio == Some(i) { 404 } else { 200 };
            Mock::given(method("GET"))
                .and(path(format!("/audio/{i}.mp3")))
                .respond_with(ResponseTemplate::new(status).set_body_bytes(vec![1u8; 128]))
                .mount(&server)
                .await;
        }
        server
    }

    fn job(server: &MockServer, count: usize) -> RenderJob {
        let texts = [
            "\u{0628}\u{0650}\u{0633}\u{0652}\u{0645}\u{0650} \u{0627}\u{0644}\u{0644}\u{0651}\u{064E}\u{0647}\u{0650}",
            "\u{0627}\u{0644}\u{0652}\u{062D}\u{064E}\u{0645}\u{0652}\u{062F}\u{064F} \u{0644}\u{0650}\u{0644}\u{0651}\u{064E}\u{0647}\u{0650}",
            "\u{0627}\u{0644}\u{0631}\u{0651}\u{064E}\u{062D}\u{0652}\u{0645}\u{064E}\u{0670}\u{0646}\u{0650}",
        ];
        let segments = (0..count)
            .map(|i| {
                OverlaySegment::new(texts[i], format!("1:{}", i + 1), format!("{}/audio/{i}.mp3", server.uri()))
            })
            .collect();
        RenderJob::new(segments, format!("{}/bg.mp4", server.uri()), 1280, 720).with_output_name("quran_1_1-3.mp4")
    }

    fn compositor(engine: Arc<FakeEngine>, root: &Path, backend: BackendPreference) -> Compositor {
        Compositor::new(
            engine,
            AssetDownloader::new(Duration::from_secs(5)).unwrap(),
            CompositorConfig {
                work_root: root.to_path_buf(),
                fonts_dir: PathBuf::from("/nonexistent/fonts"),
                backend,
            },
        )
    }

    fn entries(root: &Path) -> usize {
        std::fs::read_dir(root).unwrap().count()
    }

    #[tokio::test]
    async fn test_fallback_render_end_to_end() {
        let server = asset_server(None).await;
        let root = TempDir::new().unwrap();
        let engine = Arc::new(FakeEngine {
            durations: vec![2.0, 3.0],
            ..Default::default()
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: ProgressSink = Arc::new(move |p| sink_seen.lock().unwrap().push(p));

        let output = compositor(engine.clone(), root.path(), BackendPreference::Auto)
            .render(&job(&server, 2), Some(sink))
            .await
            .unwrap();

        assert_eq!(output.backend(), BackendMode::Fallback);
        assert_eq!(output.file_name(), "quran_1_1-3.mp4");
        assert_eq!(output.content_length().await.unwrap(), 8);
        assert!((output.duration_secs() - 5.0).abs() < 1e-9);
        assert_eq!(output.segments()[1].start, Some(2.0));
        assert_eq!(output.segments()[1].end, Some(5.0));
        assert_eq!(*seen.lock().unwrap(), vec![50, 100]);

        let graph = engine.filter_graph.lock().unwrap().clone().unwrap();
        assert!(graph.starts_with("[0:v]trim=duration=5.000,"));
        assert_eq!(graph.matches("drawtext=").count(), 4);
        assert!(!graph.contains("subtitles="));

        let list = engine.concat_list.lock().unwrap().clone().unwrap();
        assert_eq!(list.lines().count(), 2);
        assert!(list.lines().all(|l| l.starts_with("file '") && l.ends_with(".mp3'")));

        drop(output);
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_native_render_writes_subtitles() {
        let server = asset_server(None).await;
        let root = TempDir::new().unwrap();
        let engine = Arc::new(FakeEngine {
            libass: true,
            durations: vec![2.0, 3.0, 1.5],
            ..Default::default()
        });

        let output = compositor(engine.clone(), root.path(), BackendPreference::Auto)
            .render(&job(&server, 3), None)
            .await
            .unwrap();

        assert_eq!(output.backend(), BackendMode::NativeShaping);
        let subs = output.path().parent().unwrap().join(SUBTITLES_FILE);
        let doc = std::fs::read_to_string(subs).unwrap();
        assert_eq!(doc.matches("Dialogue: 0,").count(), 3);
        assert!(doc.contains("0:00:05.00,0:00:06.50"));

        let graph = engine.filter_graph.lock().unwrap().clone().unwrap();
        assert!(graph.contains("subtitles='"));
        assert!(graph.contains(":fontsdir='/nonexistent/fonts'[vout]"));
    }

    #[tokio::test]
    async fn test_forced_fallback_ignores_libass() {
        let server = asset_server(None).await;
        let root = TempDir::new().unwrap();
        let engine = Arc::new(FakeEngine {
            libass: true,
            durations: vec![2.0],
            ..Default::default()
        });

        let output = compositor(engine, root.path(), BackendPreference::Fallback)
            .render(&job(&server, 1), None)
            .await
            .unwrap();
        assert_eq!(output.backend(), BackendMode::Fallback);
    }

    #[tokio::test]
    async fn test_second_audio_failure_removes_scratch() {
        let server = asset_server(Some(1)).await;
        let root = TempDir::new().unwrap();
        let engine = Arc::new(FakeEngine {
            durations: vec![2.0, 3.0, 1.0],
            ..Default::default()
        });

        let err = compositor(engine.clone(), root.path(), BackendPreference::Auto)
            .render(&job(&server, 3), None)
            .await
            .unwrap_err();

        assert!(err.is_download_failure());
        assert_eq!(entries(root.path()), 0);
        assert!(engine.concat_list.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_encode_failure_keeps_diagnostics_and_cleans_up() {
        let server = asset_server(None).await;
        let root = TempDir::new().unwrap();
        let engine = Arc::new(FakeEngine {
            durations: vec![2.0],
            fail_encode: true,
            ..Default::default()
        });

        let err = compositor(engine, root.path(), BackendPreference::Auto)
            .render(&job(&server, 1), None)
            .await
            .unwrap_err();

        assert_eq!(err.diagnostic_output(), Some("No such filter: 'drawtext'"));
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_unprobeable_audio_defaults_to_five_seconds() {
        let server = asset_server(None).await;
        let root = TempDir::new().unwrap();
        let engine = Arc::new(FakeEngine::default());

        let output = compositor(engine.clone(), root.path(), BackendPreference::Auto)
            .render(&job(&server, 2), None)
            .await
            .unwrap();
        assert!((output.duration_secs() - 10.0).abs() < 1e-9);
        let graph = engine.filter_graph.lock().unwrap().clone().unwrap();
        assert!(graph.contains("trim=duration=10.000"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let server = asset_server(None).await;
        let root = TempDir::new().unwrap();
        let (tx, rx) = watch::channel(true);
        let engine = Arc::new(FakeEngine::default());

        let err = compositor(engine, root.path(), BackendPreference::Auto)
            .with_cancel(rx)
            .render(&job(&server, 1), None)
            .await
            .unwrap_err();
        drop(tx);

        assert!(matches!(err, MediaError::Cancelled));
        assert_eq!(entries(root.path()), 0);
    }

    #[tokio::test]
    async fn test_empty_job_rejected_without_scratch() {
        let root = TempDir::new().unwrap();
        let engine = Arc::new(FakeEngine::default());
        let job = RenderJob::new(Vec::new(), "http://127.0.0.1:9/bg.mp4", 1280, 720);

        let err = compositor(engine, root.path(), BackendPreference::Auto)
            .render(&job, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidJob(_)));
        assert_eq!(entries(root.path()), 0);
    }

    #[test]
    fn test_concat_list_line_quotes() {
        assert_eq!(concat_list_line(Path::new("/tmp/a.mp3")), "file '/tmp/a.mp3'");
        assert_eq!(concat_list_line(Path::new("/tmp/it's.mp3")), r"file '/tmp/it'\''s.mp3'");
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::DownloadAudio(2).to_string(), "download_audio[2]");
        assert_eq!(Stage::BuildFilterGraph.to_string(), "build_filter_graph");
    }
}
