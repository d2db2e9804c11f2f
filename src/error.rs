//! Error types for the h2m-batch library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`H2mError`] is **fatal**: the batch cannot proceed or has been stopped
//!   (source directory unreadable, invalid configuration, strict-mode abort).
//!   Returned as `Err(H2mError)` from the top-level `convert_dir*` functions.
//!
//! * [`JobError`] is **per-file**: one input could not be read, converted or
//!   written. Stored inside [`crate::output::JobOutcome`] so callers can
//!   inspect partial success rather than losing the whole batch to one bad
//!   file.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the h2m-batch library.
///
/// Per-file failures use [`JobError`] and are stored in
/// [`crate::output::JobOutcome`] rather than propagated here, unless the
/// batch runs in [`crate::config::FailureMode::Strict`].
#[derive(Debug, Error)]
pub enum H2mError {
    /// Source directory is missing, not a directory, or unreadable.
    #[error("Cannot read source directory '{path}': {reason}")]
    DirectoryAccess { path: PathBuf, reason: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Strict mode: the first failing file stopped the batch.
    #[error("Batch aborted: {error}")]
    Aborted {
        #[source]
        error: JobError,
    },

    /// Some files converted but at least one failed.
    ///
    /// Returned by [`crate::output::BatchReport::into_result`] when the
    /// caller wants to treat any file failure as an error.
    #[error("{failed}/{total} files failed during conversion")]
    PartialFailure {
        succeeded: usize,
        failed: usize,
        total: usize,
    },

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum JobError {
    /// The input file could not be opened or read.
    #[error("Failed to read '{path}': {detail}")]
    Read { path: PathBuf, detail: String },

    /// The converter rejected the input.
    #[error("Failed to convert '{path}': {detail}")]
    Conversion { path: PathBuf, detail: String },

    /// The converter did not finish within the configured bound.
    #[error("Conversion of '{path}' timed out after {secs}s")]
    Timeout { path: PathBuf, secs: u64 },

    /// The output file could not be written.
    #[error("Failed to write '{path}': {detail}")]
    Write { path: PathBuf, detail: String },
}

impl JobError {
    /// Path of the file the error refers to (input for read/convert, output for write).
    pub fn path(&self) -> &PathBuf {
        match self {
            JobError::Read { path, .. }
            | JobError::Conversion { path, .. }
            | JobError::Timeout { path, .. }
            | JobError::Write { path, .. } => path,
        }
    }

    /// I/O failures may be transient (permission races, busy files).
    /// Conversion failures and timeouts are content defects and never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, JobError::Read { .. } | JobError::Write { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_failure_display() {
        let e = H2mError::PartialFailure {
            succeeded: 9,
            failed: 1,
            total: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("1/10"), "got: {msg}");
    }

    #[test]
    fn directory_access_names_path() {
        let e = H2mError::DirectoryAccess {
            path: PathBuf::from("/nope/pages"),
            reason: "No such file or directory".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("/nope/pages"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn aborted_wraps_job_error() {
        let e = H2mError::Aborted {
            error: JobError::Write {
                path: PathBuf::from("out/a.md"),
                detail: "permission denied".into(),
            },
        };
        assert!(e.to_string().contains("out/a.md"));
        assert!(e.to_string().contains("permission denied"));
    }

    #[test]
    fn timeout_display() {
        let e = JobError::Timeout {
            path: PathBuf::from("big.html"),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert!(e.to_string().contains("big.html"));
    }

    #[test]
    fn only_io_errors_are_retryable() {
        let p = PathBuf::from("x.html");
        assert!(JobError::Read { path: p.clone(), detail: String::new() }.is_retryable());
        assert!(JobError::Write { path: p.clone(), detail: String::new() }.is_retryable());
        assert!(!JobError::Conversion { path: p.clone(), detail: String::new() }.is_retryable());
        assert!(!JobError::Timeout { path: p, secs: 1 }.is_retryable());
    }
}
