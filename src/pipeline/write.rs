//! Output writing: put one Markdown document on disk.
//!
//! Content goes to a temp file inside the destination directory which is then
//! renamed over the target, so readers never observe a half-written file and
//! an existing output is replaced in one step. The destination directory is
//! never created here; provisioning it is the caller's job.

use crate::error::JobError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `content` to `output_path`, replacing any existing file.
pub async fn write_markdown(output_path: &Path, content: String) -> Result<(), JobError> {
    let path = output_path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&path, content.as_bytes()))
        .await
        .map_err(|e| JobError::Write {
            path: output_path.to_path_buf(),
            detail: format!("write task panicked: {e}"),
        })?
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), JobError> {
    let fail = |detail: String| JobError::Write {
        path: path.to_path_buf(),
        detail,
    };

    let dir = parent_dir(path);
    if !dir.is_dir() {
        return Err(fail(format!(
            "destination directory '{}' does not exist",
            dir.display()
        )));
    }

    let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| fail(e.to_string()))?;
    tmp.write_all(bytes).map_err(|e| fail(e.to_string()))?;
    tmp.flush().map_err(|e| fail(e.to_string()))?;
    tmp.as_file_mut()
        .sync_all()
        .map_err(|e| fail(e.to_string()))?;
    tmp.persist(path).map_err(|e| fail(e.error.to_string()))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
