//! Caller-facing error taxonomy.

use std::path::Path;

use thiserror::Error;
use vreel_media::MediaError;
use vreel_sources::SourceError;

pub type RenderResult<T> = Result<T, RenderError>;

/// Placeholder substituted for the scratch root in diagnostics.
const REDACTED_PATH: &str = "<workdir>";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Asset download failed: {message}")]
    AssetDownload { url: String, message: String },

    #[error("Encode failed: {message}")]
    Encode {
        message: String,
        /// Engine diagnostic output, if any
        detail: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MediaError> for RenderError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::AssetDownload { url, message } => Self::AssetDownload { url, message },
            MediaError::Io(e) => Self::Io(e),
            other => Self::Encode {
                message: other.to_string(),
                detail: other.diagnostic_output().map(str::to_string),
            },
        }
    }
}

impl From<SourceError> for RenderError {
    fn from(err: SourceError) -> Self {
        Self::UpstreamFetch(err.to_string())
    }
}

impl RenderError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Short label used in metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::Validation(_) => "validation",
            RenderError::UpstreamFetch(_) => "upstream_fetch",
            RenderError::AssetDownload { .. } => "asset_download",
            RenderError::Encode { .. } => "encode",
            RenderError::Io(_) => "io",
        }
    }

    /// Message safe to show an untrusted caller.
    pub fn user_message(&self) -> String {
        match self {
            // Only echoes the caller's own parameters
            RenderError::Validation(msg) => msg.clone(),
            RenderError::UpstreamFetch(_) => "Failed to fetch verse content".to_string(),
            RenderError::AssetDownload { .. } => "Failed to download media assets".to_string(),
            RenderError::Encode { .. } => "Failed to generate video".to_string(),
            RenderError::Io(_) => "Internal error while generating video".to_string(),
        }
    }

    /// Full detail for operators, with the scratch root redacted.
    pub fn diagnostic(&self, work_root: &Path) -> String {
        let mut text = self.to_string();
        if let RenderError::AssetDownload { url, .. } = self {
            text.push_str(&format!(" ({})", url));
        }
        if let RenderError::Encode { detail: Some(detail), .. } = self {
            text.push('\n');
            text.push_str(detail);
        }
        redact(&text, work_root)
    }
}

fn redact(text: &str, root: &Path) -> String {
    let root = root.to_string_lossy();
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return text.to_string();
    }
    text.replace(root, REDACTED_PATH)
}
