//! Error types for upstream collaborators.

use thiserror::Error;

/// Result type for collaborator calls.
pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status} for {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("Malformed upstream response: {0}")]
    Decode(String),

    #[error("No results: {0}")]
    Empty(String),

    #[error("No narration for verse {0}")]
    MissingAudio(String),

    #[error("Invalid source configuration: {0}")]
    Config(String),
}

impl SourceError {
    pub fn empty(what: impl Into<String>) -> Self {
        Self::Empty(what.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Transient network failures and overloaded upstreams are worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            SourceError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
