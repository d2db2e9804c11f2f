//! Reporter trait for per-file batch events.
//!
//! Inject an [`Arc<dyn BatchReporter>`] via
//! [`crate::config::BatchConfigBuilder::reporter`] to receive events as the
//! pipeline processes each file. When none is configured the batch uses
//! [`LogReporter`], which writes one `tracing` line per file.
//!
//! # Example
//!
//! ```rust
//! use h2m_batch::{BatchConfig, BatchReporter};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingReporter {
//!     written: AtomicUsize,
//! }
//!
//! impl BatchReporter for CountingReporter {
//!     fn on_file_written(&self, _input: &Path, output: &Path, markdown_len: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} ({} bytes)", output.display(), markdown_len);
//!     }
//! }
//!
//! let config = BatchConfig::builder()
//!     .reporter(Arc::new(CountingReporter { written: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::JobError;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Called by the orchestrator as it processes each file.
///
/// Implementations must be `Send + Sync`: with `concurrency > 1` the
/// per-file methods may be called from several tasks at once. All methods
/// have default no-op implementations.
pub trait BatchReporter: Send + Sync {
    /// Called once after listing, before any file is read.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called before a file is read.
    fn on_file_start(&self, input: &Path) {
        let _ = input;
    }

    /// Called after a file's Markdown is on disk.
    fn on_file_written(&self, input: &Path, output: &Path, markdown_len: usize) {
        let _ = (input, output, markdown_len);
    }

    /// Called when a file fails after all retries are exhausted.
    fn on_file_error(&self, error: &JobError) {
        let _ = error;
    }

    /// Called once when the batch ends, including after a strict-mode abort.
    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        let _ = (succeeded, failed);
    }
}

/// Discards every event.
pub struct NoopReporter;

impl BatchReporter for NoopReporter {}

/// Default reporter: one `tracing` line per output written or file failed.
pub struct LogReporter;

impl BatchReporter for LogReporter {
    fn on_batch_start(&self, total_files: usize) {
        info!("Converting {} files", total_files);
    }

    fn on_file_written(&self, _input: &Path, output: &Path, markdown_len: usize) {
        info!("Wrote {} ({} bytes)", output.display(), markdown_len);
    }

    fn on_file_error(&self, error: &JobError) {
        warn!("{}", error);
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        info!("Batch finished: {} written, {} failed", succeeded, failed);
    }
}

/// Convenience alias matching the type stored in [`crate::config::BatchConfig`].
pub type Reporter = Arc<dyn BatchReporter>;
