//! Retry with exponential backoff for upstream requests.
//!
//! Only errors reporting [`SourceError::is_retryable`] are retried; anything
//! else propagates on the first attempt.

use std::future::Future;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};

/// Retry counter name.
pub const SOURCE_RETRIES_TOTAL: &str = "vreel_source_retries_total";

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each time.
    pub base_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Default::default()
        }
    }

    /// Policy that never sleeps, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Delay after the given failed attempt (1-based): 1s, 2s, 4s, ...
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    pub async fn run<F, Fut, T>(&self, operation_name: &str, operation: F) -> SourceResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        let mut attempt = 1u32;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for_attempt(attempt);
                    counter!(SOURCE_RETRIES_TOTAL, "operation" => operation_name.to_string()).increment(1);
                    debug!(
                        "{} attempt {}/{} failed, retrying in {:?}: {}",
                        operation_name, attempt, self.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!(operation = operation_name, attempts = attempt, error = %e, "Retries exhausted");
                    }
                    return Err(e);
                }
            }
        }
    }
}

/// Convenience for a non-success status.
pub(crate) fn status_error(status: reqwest::StatusCode, endpoint: &str) -> SourceError {
    SourceError::Status {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
    }
}
