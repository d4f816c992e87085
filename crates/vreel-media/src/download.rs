//! Remote asset downloads into a job's scratch directory.

use std::path::Path;
use std::time::{Duration, Instant};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

const USER_AGENT: &str = concat!("vreel/", env!("CARGO_PKG_VERSION"));

/// HTTP downloader with a per-asset timeout.
#[derive(Debug, Clone)]
pub struct AssetDownloader {
    client: reqwest::Client,
    timeout: Duration,
}

impl AssetDownloader {
    /// Build a downloader with its own HTTP client.
    pub fn new(timeout: Duration) -> MediaResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| MediaError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Reuse an existing client.
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Stream `url` into `dest`, returning the byte count.
    ///
    /// Every network failure, HTTP error status, timeout or empty body is
    /// reported as [`MediaError::AssetDownload`]; local write failures are
    /// I/O errors.
    pub async fn download(&self, url: &str, dest: &Path) -> MediaResult<u64> {
        let started = Instant::now();
        let bytes = match tokio::time::timeout(self.timeout, self.fetch(url, dest)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(MediaError::download_failed(
                    url,
                    format!("timed out after {}s", self.timeout.as_secs()),
                ))
            }
        };

        info!(
            url = %url,
            bytes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Downloaded asset"
        );
        Ok(bytes)
    }

    async fn fetch(&self, url: &str, dest: &Path) -> MediaResult<u64> {
        debug!(url = %url, dest = %dest.display(), "Fetching asset");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::download_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::download_failed(url, format!("HTTP {}", status.as_u16())));
        }

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| MediaError::download_failed(url, e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(MediaError::download_failed(url, "empty response body"));
        }

        Ok(written)
    }
}
