//! Result types produced by a batch run.
//!
//! Every file that enters the pipeline yields exactly one [`JobOutcome`].
//! The orchestrator folds them into a [`BatchReport`], which is what
//! [`crate::convert::convert_dir`] returns and what `h2m --json` prints.

use crate::error::{H2mError, JobError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Lifecycle of one conversion job.
///
/// `Listed → Read → Converted → Written → Done`, with `Failed` reachable
/// from the read, convert and write steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Listed,
    Read,
    Converted,
    Written,
    Done,
    Failed,
}

/// Final record of one file's journey through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    /// Input file (source directory + entry name).
    pub input_path: PathBuf,
    /// Output file (destination directory + stem + output extension).
    pub output_path: PathBuf,
    /// `Done` on success, `Failed` otherwise.
    pub state: JobState,
    /// Byte length of the Markdown written (0 on failure).
    pub markdown_len: usize,
    /// Read/write retries consumed.
    pub retries: u32,
    /// Wall-clock time spent on this file.
    pub duration_ms: u64,
    /// Set when `state == Failed`.
    pub error: Option<JobError>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate result of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-file outcomes, sorted by input path.
    pub jobs: Vec<JobOutcome>,
    /// Number of files that were written.
    pub succeeded: usize,
    /// Number of files that failed.
    pub failed: usize,
    /// Directory entries ignored (directories, wrong extension).
    pub skipped: usize,
    pub total_duration_ms: u64,
}

impl BatchReport {
    /// Fold outcomes into a report. `skipped` comes from the lister.
    pub fn from_outcomes(mut jobs: Vec<JobOutcome>, skipped: usize, total_duration_ms: u64) -> Self {
        jobs.sort_by(|a, b| a.input_path.cmp(&b.input_path));
        let succeeded = jobs.iter().filter(|j| j.is_success()).count();
        let failed = jobs.len() - succeeded;
        Self {
            jobs,
            succeeded,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    /// Files that entered the pipeline.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    /// Errors of every failed job, in input-path order.
    pub fn errors(&self) -> impl Iterator<Item = &JobError> {
        self.jobs.iter().filter_map(|j| j.error.as_ref())
    }

    /// Treat any failed file as an error.
    pub fn into_result(self) -> Result<Self, H2mError> {
        if self.failed == 0 {
            Ok(self)
        } else {
            Err(H2mError::PartialFailure {
                succeeded: self.succeeded,
                failed: self.failed,
                total: self.total(),
            })
        }
    }
}
