//! Input reading: load one HTML file into memory.
//!
//! Files are single web pages, so the whole file is read at once.

use crate::error::JobError;
use crate::pipeline::list::is_regular_file;
use std::path::Path;
use tracing::debug;

/// Read `path` as UTF-8 text.
///
/// An I/O failure (including the file vanishing between listing and
/// reading) is a [`JobError::Read`]; bytes that are not UTF-8 are a
/// [`JobError::Conversion`] because retrying cannot fix them. A path that is
/// not a regular file is refused before it is opened, since opening a FIFO
/// blocks.
pub async fn read_html(path: &Path) -> Result<String, JobError> {
    if !is_regular_file(path).await {
        let detail = match tokio::fs::metadata(path).await {
            Ok(_) => "not a regular file".to_string(),
            Err(e) => e.to_string(),
        };
        return Err(JobError::Read {
            path: path.to_path_buf(),
            detail,
        });
    }
    let bytes = tokio::fs::read(path).await.map_err(|e| JobError::Read {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    String::from_utf8(bytes).map_err(|e| JobError::Conversion {
        path: path.to_path_buf(),
        detail: format!("input is not valid UTF-8: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn reads_utf8_content() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("a.html");
        std::fs::write(&p, "<p>héllo</p>").unwrap();
        assert_eq!(read_html(&p).await.unwrap(), "<p>héllo</p>");
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("gone.html");
        let err = read_html(&p).await.unwrap_err();
        assert!(matches!(err, JobError::Read { .. }), "got {err:?}");
        assert_eq!(err.path(), &p);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fifo_is_refused_without_blocking() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("pipe.html");
        let status = std::process::Command::new("mkfifo").arg(&p).status().unwrap();
        assert!(status.success());

        let err = tokio::time::timeout(std::time::Duration::from_secs(5), read_html(&p))
            .await
            .expect("read_html blocked on a FIFO")
            .unwrap_err();
        match err {
            JobError::Read { detail, .. } => assert_eq!(detail, "not a regular file"),
            other => panic!("expected Read, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_utf8_is_conversion_error() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("latin1.html");
        std::fs::write(&p, [0x3c, 0x70, 0x3e, 0xff, 0xfe]).unwrap();
        let err = read_html(&p).await.unwrap_err();
        assert!(matches!(err, JobError::Conversion { .. }), "got {err:?}");
        assert!(!err.is_retryable());
    }
}
