//! The render engine seam and its FFmpeg implementation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info};

use vreel_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::filters::VIDEO_OUT_LABEL;
use crate::probe::{self, EngineCapabilities};
use crate::progress::ProgressSink;

/// Inputs of the final encode.
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    /// Background video, looped and trimmed by the graph
    pub background: PathBuf,
    /// Concatenated narration track
    pub audio: PathBuf,
    /// File holding the filter graph
    pub filter_script: PathBuf,
    pub output: PathBuf,
    /// Program length after the render cap
    pub duration_secs: f64,
    pub encoding: EncodingConfig,
    /// Flips to `true` to abort the encode
    pub cancel: Option<watch::Receiver<bool>>,
}

/// External compositing engine used by the compositor.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Text-rendering features available to overlay programs.
    async fn capabilities(&self) -> MediaResult<EngineCapabilities>;

    /// Length of a media file in seconds.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;

    /// Losslessly join the files named in a concat list.
    async fn concat_audio(&self, list_file: &Path, output: &Path) -> MediaResult<()>;

    /// Produce the final file, reporting 0..=100 through `progress`.
    async fn encode(&self, request: &EncodeRequest, progress: Option<ProgressSink>) -> MediaResult<()>;
}

/// [`RenderEngine`] backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    step_timeout: Duration,
    encode_timeout: Duration,
}

impl FfmpegEngine {
    pub fn new(step_timeout: Duration, encode_timeout: Duration) -> Self {
        Self {
            step_timeout,
            encode_timeout,
        }
    }

    /// Command for the final encode.
    pub fn encode_command(request: &EncodeRequest) -> FfmpegCommand {
        FfmpegCommand::new(&request.output)
            .looped_input(&request.background)
            .input(&request.audio)
            .filter_complex_script(&request.filter_script)
            .map(format!("[{VIDEO_OUT_LABEL}]"))
            .map("1:a")
            .encoding(&request.encoding)
            .duration(request.duration_secs)
            .shortest()
            .faststart()
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new(Duration::from_secs(120), Duration::from_secs(900))
    }
}

#[async_trait]
impl RenderEngine for FfmpegEngine {
    async fn capabilities(&self) -> MediaResult<EngineCapabilities> {
        probe::probe_capabilities(self.step_timeout).await
    }

    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        probe::probe_duration(path, self.step_timeout).await
    }

    async fn concat_audio(&self, list_file: &Path, output: &Path) -> MediaResult<()> {
        let cmd = FfmpegCommand::new(output).concat_list_input(list_file).stream_copy();
        FfmpegRunner::new()
            .with_timeout(self.step_timeout.as_secs().max(1))
            .run(&cmd)
            .await
    }

    async fn encode(&self, request: &EncodeRequest, progress: Option<ProgressSink>) -> MediaResult<()> {
        let cmd = Self::encode_command(request);

        let mut runner = FfmpegRunner::new().with_timeout(self.encode_timeout.as_secs().max(1));
        if let Some(cancel) = request.cancel.clone() {
            runner = runner.with_cancel(cancel);
        }

        info!(duration_secs = request.duration_secs, output = %request.output.display(), "Starting encode");

        let total_secs = request.duration_secs;
        let last = Arc::new(AtomicU8::new(0));
        runner
            .run_with_progress(&cmd, move |p| {
                let percent = p.percent_of(total_secs);
                // Only forward increases
                if percent > last.fetch_max(percent, Ordering::Relaxed) {
                    debug!(
                        percent,
                        speed = p.speed,
                        eta_secs = ?p.eta_seconds((total_secs * 1000.0) as i64),
                        "Encode progress"
                    );
                    if let Some(sink) = &progress {
                        sink(percent);
                    }
                }
            })
            .await
    }
}
