//! FFprobe media information and FFmpeg build capabilities.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::command::{check_ffmpeg, check_ffprobe};
use crate::error::{MediaError, MediaResult};

/// Media file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds, if the container reports one
    pub duration: Option<f64>,
    /// Whether a video stream is present
    pub has_video: bool,
    /// Whether an audio stream is present
    pub has_audio: bool,
    /// Width of the first video stream
    pub width: Option<u32>,
    /// Height of the first video stream
    pub height: Option<u32>,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
}

impl FfprobeOutput {
    fn into_info(self) -> MediaInfo {
        let duration = self
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0);
        let video = self.streams.iter().find(|s| s.codec_type == "video");

        MediaInfo {
            duration,
            has_video: video.is_some(),
            has_audio: self.streams.iter().any(|s| s.codec_type == "audio"),
            width: video.and_then(|s| s.width),
            height: video.and_then(|s| s.height),
        }
    }
}

/// Probe a media file.
pub async fn probe_media(path: impl AsRef<Path>, timeout: Duration) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let ffprobe = check_ffprobe()?;

    let child = Command::new(ffprobe)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, child)
        .await
        .map_err(|_| MediaError::Timeout(timeout.as_secs()))??;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    Ok(probe.into_info())
}

/// Duration in seconds, failing when the container reports none.
pub async fn probe_duration(path: impl AsRef<Path>, timeout: Duration) -> MediaResult<f64> {
    let path = path.as_ref();
    probe_media(path, timeout)
        .await?
        .duration
        .ok_or_else(|| MediaError::InvalidVideo(format!("no duration reported for {}", path.display())))
}

/// Text-rendering libraries compiled into FFmpeg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineCapabilities {
    pub libass: bool,
    pub harfbuzz: bool,
    pub fribidi: bool,
    pub freetype: bool,
    pub fontconfig: bool,
}

impl EngineCapabilities {
    /// Scan `ffmpeg -buildconf` output for `--enable-lib<name>` flags.
    ///
    /// Older builds spell fontconfig without the `lib` prefix.
    pub fn from_buildconf(buildconf: &str) -> Self {
        let has = |name: &str| {
            buildconf.split_whitespace().any(|flag| {
                flag.strip_prefix("--enable-")
                    .map(|lib| lib.strip_prefix("lib").unwrap_or(lib) == name)
                    .unwrap_or(false)
            })
        };
        Self {
            libass: has("ass"),
            harfbuzz: has("harfbuzz"),
            fribidi: has("fribidi"),
            freetype: has("freetype"),
            fontconfig: has("fontconfig"),
        }
    }

    /// The subtitle burn-in path needs libass; HarfBuzz and FriBidi come with it.
    pub fn supports_native_shaping(&self) -> bool {
        self.libass
    }
}

/// Query FFmpeg's build configuration.
pub async fn probe_capabilities(timeout: Duration) -> MediaResult<EngineCapabilities> {
    let ffmpeg = check_ffmpeg()?;

    let child = Command::new(ffmpeg)
        .args(["-hide_banner", "-buildconf"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, child)
        .await
        .map_err(|_| MediaError::Timeout(timeout.as_secs()))??;

    if !output.status.success() {
        return Err(MediaError::ffmpeg_failed(
            "ffmpeg -buildconf failed",
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    // Older builds print the configuration to stderr
    let mut text = String::from_utf8_lossy(&output.stdout).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let caps = EngineCapabilities::from_buildconf(&text);
    debug!(?caps, "Probed FFmpeg capabilities");
    Ok(caps)
}
