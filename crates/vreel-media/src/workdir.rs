//! Per-job scratch directories.
//!
//! A [`ScratchDir`] is created at job start and removed when dropped, so
//! every exit path (error, cancellation, panic unwinding) reclaims it.
//! Directories left behind by a killed process are removed by
//! [`sweep_orphaned`].

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::MediaResult;

/// Name prefix of every job directory.
pub const JOB_DIR_PREFIX: &str = "vreel-job-";

/// Exclusive working directory of one job.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh directory under `root`, creating `root` if needed.
    pub fn create(root: impl AsRef<Path>) -> MediaResult<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new().prefix(JOB_DIR_PREFIX).tempdir_in(root)?;
        debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the directory.
    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Delete now and report failures instead of ignoring them.
    pub fn close(self) -> MediaResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "Removed scratch directory");
        Ok(())
    }
}

/// Remove job directories under `root` not modified within `max_age`.
///
/// Returns the number of directories removed. A missing root is not an error.
pub async fn sweep_orphaned(root: impl AsRef<Path>, max_age: Duration) -> MediaResult<usize> {
    let root = root.as_ref();
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if !name.to_string_lossy().starts_with(JOB_DIR_PREFIX) {
            continue;
        }

        let metadata = match entry.metadata().await {
            Ok(m) if m.is_dir() => m,
            _ => continue,
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age < max_age {
            continue;
        }

        match tokio::fs::remove_dir_all(entry.path()).await {
            Ok(()) => {
                removed += 1;
                debug!(path = %entry.path().display(), age_secs = age.as_secs(), "Removed orphaned job directory");
            }
            Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to remove orphaned job directory"),
        }
    }

    if removed > 0 {
        info!(root = %root.display(), removed, "Swept orphaned job directories");
    }
    Ok(removed)
}
