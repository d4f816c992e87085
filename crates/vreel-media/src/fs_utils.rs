//! Moving rendered files out of scratch directories.
//!
//! The scratch root and the delivery destination are often on different
//! filesystems (tmpfs vs. a mounted volume), where `rename` fails with EXDEV.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Move a file from `src` to `dst`, copying when a rename crosses devices.
///
/// The destination's parent is created when missing. A cross-device copy
/// goes to a sibling `.partial` file first and is renamed into place, so
/// `dst` never holds a truncated file.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                src = %src.display(),
                dst = %dst.display(),
                "Cross-device rename, falling back to copy"
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// EXDEV is 18 on Linux and macOS.
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

fn partial_path(dst: &Path) -> PathBuf {
    let mut name = dst.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    dst.with_file_name(name)
}

async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let tmp_dst = partial_path(dst);

    if let Err(e) = fs::copy(src, &tmp_dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        tracing::error!(src = %src.display(), error = %e, "Cross-device copy failed");
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp_dst, dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        tracing::error!(dst = %dst.display(), error = %e, "Failed to move copied file into place");
        return Err(e.into());
    }

    // The scratch directory is removed afterwards anyway
    if let Err(e) = fs::remove_file(src).await {
        tracing::warn!(src = %src.display(), error = %e, "Failed to remove source after copy");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_file_same_filesystem() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("output.mp4");
        let dst = dir.path().join("quran_1_1-7.mp4");

        fs::write(&src, b"video").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"video");
    }

    #[tokio::test]
    async fn test_move_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("output.mp4");
        let dst = dir.path().join("renders").join("2026").join("out.mp4");

        fs::write(&src, b"video").await.unwrap();
        move_file(&src, &dst).await.unwrap();
        assert!(dst.exists());
    }

    #[tokio::test]
    async fn test_copy_and_delete_leaves_no_partial() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("output.mp4");
        let dst = dir.path().join("final.mp4");

        fs::write(&src, b"video").await.unwrap();
        copy_and_delete(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert!(dst.exists());
        assert!(!partial_path(&dst).exists());
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(partial_path(Path::new("/out/a.mp4")), PathBuf::from("/out/a.mp4.partial"));
    }

    #[test]
    fn test_is_cross_device_error() {
        assert!(is_cross_device_error(&std::io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device_error(&std::io::Error::from_raw_os_error(2)));
    }
}
