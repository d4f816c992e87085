//! Worker configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use vreel_media::{BackendPreference, CompositorConfig};
use vreel_sources::pixabay::{self, PixabayConfig};
use vreel_sources::quran::{self, QuranComConfig};
use vreel_sources::RetryPolicy;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Parent of per-job scratch directories
    pub work_dir: PathBuf,
    /// Directory holding the font catalog files
    pub fonts_dir: PathBuf,
    /// Limit for the final encode
    pub encode_timeout: Duration,
    /// Limit for downloads, probes and audio concatenation
    pub step_timeout: Duration,
    /// Scratch directories older than this are swept at startup
    pub orphan_max_age: Duration,
    pub overlay_backend: BackendPreference,
    pub quran_api_base: String,
    pub quran_audio_base: String,
    pub pixabay_api_base: String,
    /// Required for background search
    pub pixabay_api_key: Option<String>,
    /// Total attempts for upstream requests
    pub retry_max_attempts: u32,
    pub retry_base_delay: Duration,
    /// Prometheus listener, disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("vreel")
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            fonts_dir: PathBuf::from("./assets/fonts"),
            encode_timeout: Duration::from_secs(900),
            step_timeout: Duration::from_secs(120),
            orphan_max_age: Duration::from_secs(3600),
            overlay_backend: BackendPreference::Auto,
            quran_api_base: quran::DEFAULT_API_BASE.to_string(),
            quran_audio_base: quran::DEFAULT_AUDIO_BASE.to_string(),
            pixabay_api_base: pixabay::DEFAULT_API_BASE.to_string(),
            pixabay_api_key: None,
            retry_max_attempts: 3,
            retry_base_delay: Duration::from_millis(1000),
            metrics_addr: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            work_dir: lookup("VREEL_WORK_DIR").map(PathBuf::from).unwrap_or(defaults.work_dir),
            fonts_dir: lookup("VREEL_FONTS_DIR").map(PathBuf::from).unwrap_or(defaults.fonts_dir),
            encode_timeout: secs("VREEL_ENCODE_TIMEOUT_SECS", defaults.encode_timeout),
            step_timeout: secs("VREEL_STEP_TIMEOUT_SECS", defaults.step_timeout),
            orphan_max_age: secs("VREEL_ORPHAN_MAX_AGE_SECS", defaults.orphan_max_age),
            overlay_backend: lookup("VREEL_OVERLAY_BACKEND")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.overlay_backend),
            quran_api_base: lookup("QURAN_API_BASE").unwrap_or(defaults.quran_api_base),
            quran_audio_base: lookup("QURAN_AUDIO_BASE").unwrap_or(defaults.quran_audio_base),
            pixabay_api_base: lookup("PIXABAY_API_BASE").unwrap_or(defaults.pixabay_api_base),
            pixabay_api_key: lookup("PIXABAY_API_KEY").filter(|k| !k.trim().is_empty()),
            retry_max_attempts: lookup("SOURCE_RETRY_MAX_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.retry_max_attempts),
            retry_base_delay: lookup("SOURCE_RETRY_BASE_MS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_base_delay),
            metrics_addr: lookup("METRICS_ADDR").and_then(|s| s.parse().ok()),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max_attempts, self.retry_base_delay)
    }

    pub fn compositor_config(&self) -> CompositorConfig {
        CompositorConfig {
            work_root: self.work_dir.clone(),
            fonts_dir: self.fonts_dir.clone(),
            backend: self.overlay_backend,
        }
    }

    pub fn quran_config(&self) -> QuranComConfig {
        QuranComConfig {
            api_base: self.quran_api_base.clone(),
            audio_base: self.quran_audio_base.clone(),
            request_timeout: self.step_timeout,
            retry: self.retry_policy(),
            ..Default::default()
        }
    }

    /// `None` when no API key is configured.
    pub fn pixabay_config(&self) -> Option<PixabayConfig> {
        let key = self.pixabay_api_key.clone()?;
        Some(PixabayConfig {
            api_base: self.pixabay_api_base.clone(),
            api_key: key,
            request_timeout: self.step_timeout,
            retry: self.retry_policy(),
        })
    }
}
