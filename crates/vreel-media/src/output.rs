//! Rendered file handed back to the caller.

use std::path::{Path, PathBuf};

use tracing::debug;
use vreel_models::OverlaySegment;

use crate::error::MediaResult;
use crate::fs_utils::move_file;
use crate::overlay::BackendMode;
use crate::workdir::ScratchDir;

/// A finished render. The scratch directory behind it lives until this
/// value is dropped or persisted, so the file stays readable meanwhile.
#[derive(Debug)]
pub struct RenderOutput {
    scratch: ScratchDir,
    path: PathBuf,
    file_name: String,
    duration_secs: f64,
    backend: BackendMode,
    segments: Vec<OverlaySegment>,
}

impl RenderOutput {
    pub(crate) fn new(
        scratch: ScratchDir,
        path: PathBuf,
        file_name: impl Into<String>,
        duration_secs: f64,
        backend: BackendMode,
        segments: Vec<OverlaySegment>,
    ) -> Self {
        Self {
            scratch,
            path,
            file_name: file_name.into(),
            duration_secs,
            backend,
            segments,
        }
    }

    /// Location of the encoded file inside the scratch directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deterministic download name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Encoded program length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    pub fn backend(&self) -> BackendMode {
        self.backend
    }

    /// Segments with their assigned start and end times.
    pub fn segments(&self) -> &[OverlaySegment] {
        &self.segments
    }

    /// Size in bytes, for a `Content-Length` header.
    pub async fn content_length(&self) -> MediaResult<u64> {
        Ok(tokio::fs::metadata(&self.path).await?.len())
    }

    /// Open the file for streaming.
    pub async fn open(&self) -> MediaResult<tokio::fs::File> {
        Ok(tokio::fs::File::open(&self.path).await?)
    }

    /// Move the file to `dest`, then release the scratch directory.
    pub async fn persist_to(self, dest: impl AsRef<Path>) -> MediaResult<PathBuf> {
        let dest = dest.as_ref().to_path_buf();
        move_file(&self.path, &dest).await?;
        debug!(dest = %dest.display(), "Persisted render output");
        self.scratch.close()?;
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    async fn output_in(root: &Path) -> RenderOutput {
        let scratch = ScratchDir::create(root).unwrap();
        let path = scratch.join("output.mp4");
        tokio::fs::write(&path, b"fake mp4 bytes").await.unwrap();
        RenderOutput::new(scratch, path, "quran_1_1-7.mp4", 12.0, BackendMode::Fallback, Vec::new())
    }

    #[tokio::test]
    async fn test_content_length_and_open() {
        let root = TempDir::new().unwrap();
        let output = output_in(root.path()).await;
        assert_eq!(output.content_length().await.unwrap(), 14);

        let mut buf = String::new();
        output.open().await.unwrap().read_to_string(&mut buf).await.unwrap();
        assert_eq!(buf, "fake mp4 bytes");
        assert_eq!(output.file_name(), "quran_1_1-7.mp4");
    }

    #[tokio::test]
    async fn test_persist_releases_scratch() {
        let root = TempDir::new().unwrap();
        let dest_dir = TempDir::new().unwrap();
        let output = output_in(root.path()).await;
        let scratch_path = output.path().parent().unwrap().to_path_buf();

        let dest = output.persist_to(dest_dir.path().join("quran_1_1-7.mp4")).await.unwrap();
        assert!(dest.exists());
        assert!(!scratch_path.exists());
    }

    #[tokio::test]
    async fn test_drop_releases_scratch() {
        let root = TempDir::new().unwrap();
        let output = output_in(root.path()).await;
        let scratch_path = output.path().parent().unwrap().to_path_buf();
        drop(output);
        assert!(!scratch_path.exists());
    }
}
