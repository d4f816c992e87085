//! FFmpeg command builder and runner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use vreel_models::EncodingConfig;

use crate::error::{MediaError, MediaResult};
use crate::progress::FfmpegProgress;

/// Diagnostic lines kept from FFmpeg's stderr for error reports.
pub const STDERR_TAIL_LINES: usize = 20;

/// One `-i` input with the options that precede it.
#[derive(Debug, Clone)]
struct Input {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Inputs in index order
    inputs: Vec<Input>,
    /// Output file path
    output: PathBuf,
    /// Output arguments (after all inputs)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command writing to `output`.
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output: output.as_ref().to_path_buf(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add a plain input.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with_args(Vec::<String>::new(), path)
    }

    /// Add an input with per-input options.
    pub fn input_with_args<I, S>(mut self, args: I, path: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(Input {
            args: args.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an input that loops forever.
    pub fn looped_input(self, path: impl AsRef<Path>) -> Self {
        self.input_with_args(["-stream_loop", "-1"], path)
    }

    /// Add a concat-demuxer list file as input.
    pub fn concat_list_input(self, list: impl AsRef<Path>) -> Self {
        self.input_with_args(["-f", "concat", "-safe", "0"], list)
    }

    /// Add output arguments.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Read the filter graph from a file.
    pub fn filter_complex_script(self, path: impl AsRef<Path>) -> Self {
        self.output_arg("-filter_complex_script")
            .output_arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Map a stream or filter pad into the output.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Copy streams without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Apply codec, preset, CRF and audio settings.
    pub fn encoding(self, config: &EncodingConfig) -> Self {
        self.output_args(config.to_ffmpeg_args())
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Stop at the end of the shortest stream.
    pub fn shortest(self) -> Self {
        self.output_arg("-shortest")
    }

    /// Move the index to the front for progressive playback.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("+faststart")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Machine-readable progress on stderr, no interactive stats line
        args.push("-nostats".to_string());
        args.push("-progress".to_string());
        args.push("pipe:2".to_string());

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with progress tracking and cancellation.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

enum WaitOutcome {
    Exited(std::io::Result<ExitStatus>),
    TimedOut(u64),
    Cancelled,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        self.run_with_progress(cmd, |_| {}).await
    }

    /// Run an FFmpeg command with progress callback.
    pub async fn run_with_progress<F>(&self, cmd: &FfmpegCommand, progress_callback: F) -> MediaResult<()>
    where
        F: Fn(FfmpegProgress) + Send + 'static,
    {
        let ffmpeg = check_ffmpeg()?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new(ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MediaError::internal("FFmpeg stderr was not captured"))?;
        let mut reader = BufReader::new(stderr).lines();

        // Progress parsing and diagnostic capture share the stderr stream
        let stderr_handle = tokio::spawn(async move {
            let mut current_progress = FfmpegProgress::default();
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);

            while let Ok(Some(line)) = reader.next_line().await {
                if is_progress_line(&line) {
                    if let Some(progress) = parse_progress_line(&line, &mut current_progress) {
                        progress_callback(progress);
                    }
                } else if !line.trim().is_empty() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }

            tail.into_iter().collect::<Vec<_>>().join("\n")
        });

        let outcome = self.wait_for_completion(&mut child).await;
        let stderr_tail = stderr_handle.await.unwrap_or_default();

        match outcome {
            WaitOutcome::Exited(status) => {
                let status = status?;
                if status.success() {
                    Ok(())
                } else {
                    warn!(exit_code = ?status.code(), "FFmpeg exited with non-zero status");
                    Err(MediaError::ffmpeg_failed(
                        "FFmpeg exited with non-zero status",
                        (!stderr_tail.is_empty()).then_some(stderr_tail),
                        status.code(),
                    ))
                }
            }
            WaitOutcome::TimedOut(secs) => Err(MediaError::Timeout(secs)),
            WaitOutcome::Cancelled => Err(MediaError::Cancelled),
        }
    }

    /// Wait for child process with cancellation and timeout.
    async fn wait_for_completion(&self, child: &mut Child) -> WaitOutcome {
        let timeout_secs = self.timeout_secs;
        let timeout = async move {
            match timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancel_rx = self.cancel_rx.clone();
        let cancelled = async move {
            match cancel_rx {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        // Sender gone: nobody can cancel any more
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending::<()>().await,
            }
        };

        let outcome = tokio::select! {
            status = child.wait() => WaitOutcome::Exited(status),
            _ = timeout => WaitOutcome::TimedOut(timeout_secs.unwrap_or_default()),
            _ = cancelled => WaitOutcome::Cancelled,
        };

        match outcome {
            WaitOutcome::TimedOut(secs) => {
                warn!("FFmpeg timed out after {} seconds, killing process", secs);
                let _ = child.kill().await;
            }
            WaitOutcome::Cancelled => {
                info!("FFmpeg cancelled, killing process");
                let _ = child.kill().await;
            }
            WaitOutcome::Exited(_) => {}
        }

        outcome
    }
}

/// `key=value` lines emitted by `-progress`.
fn is_progress_line(line: &str) -> bool {
    match line.trim().split_once('=') {
        Some((key, _)) => !key.is_empty() && key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
        None => false,
    }
}

/// Parse a progress line from FFmpeg's -progress output.
fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let line = line.trim();

    if let Some((key, value)) = line.split_once('=') {
        match key {
            "out_time_ms" | "out_time_us" => {
                // Both keys carry microseconds despite the name
                if let Ok(us) = value.parse::<i64>() {
                    current.out_time_ms = us / 1000;
                }
            }
            "speed" => {
                // Format: "1.5x" or "N/A"
                if let Some(speed) = value.trim().strip_suffix('x').and_then(|s| s.parse().ok()) {
                    current.speed = speed;
                }
            }
            "progress" => {
                if value == "end" {
                    current.is_complete = true;
                }
                return Some(current.clone());
            }
            _ => {}
        }
    }

    None
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_command_args() {
        let cmd = FfmpegCommand::new("/job/output.mp4")
            .looped_input("/job/background.mp4")
            .input("/job/merged_audio.mp3")
            .filter_complex_script("/job/filters.txt")
            .map("[vout]")
            .map("1:a")
            .encoding(&EncodingConfig::default())
            .duration(9.5)
            .shortest()
            .faststart();

        let args = cmd.build_args();
        let joined = args.join(" ");
        assert!(joined.starts_with("-y -v error -nostats -progress pipe:2 "));
        assert!(joined.contains("-stream_loop -1 -i /job/background.mp4 -i /job/merged_audio.mp3"));
        assert!(joined.contains("-filter_complex_script /job/filters.txt -map [vout] -map 1:a"));
        assert!(joined.contains("-c:v libx264 -preset fast -crf 23 -c:a aac -b:a 256k"));
        assert!(joined.ends_with("-t 9.500 -shortest -movflags +faststart /job/output.mp4"));
    }

    #[test]
    fn test_concat_command_args() {
        let args = FfmpegCommand::new("merged.mp3")
            .concat_list_input("list.txt")
            .stream_copy()
            .build_args();
        let joined = args.join(" ");
        assert!(joined.contains("-f concat -safe 0 -i list.txt -c copy merged.mp3"));
    }

    #[test]
    fn test_progress_parsing() {
        let mut progress = FfmpegProgress::default();

        parse_progress_line("out_time_us=5000000", &mut progress);
        assert_eq!(progress.out_time_ms, 5000);

        parse_progress_line("speed=1.5x", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        parse_progress_line("speed=N/A", &mut progress);
        assert!((progress.speed - 1.5).abs() < 0.01);

        let result = parse_progress_line("progress=end", &mut progress);
        assert!(result.is_some());
        assert!(progress.is_complete);
    }

    #[test]
    fn test_progress_lines_separated_from_diagnostics() {
        assert!(is_progress_line("out_time_us=100"));
        assert!(is_progress_line("stream_0_0_q=28.0"));
        assert!(!is_progress_line("[Parsed_subtitles_0 @ 0x55] Unable to open font"));
        assert!(!is_progress_line("Error opening input file bg.mp4."));
        assert!(!is_progress_line("Invalid argument"));
    }
}
