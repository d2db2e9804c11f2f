//! # h2m-batch
//!
//! Convert a directory of HTML pages to Markdown, one output file per input.
//!
//! Every `<stem>.html` in the source directory becomes `<stem>.md` in a
//! pre-existing destination directory. The HTML-to-Markdown engine is
//! pluggable ([`MarkdownConverter`]); the crate owns listing, file I/O,
//! naming, retries, timeouts and the failure policy around it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! source dir
//!  │
//!  ├─ 1. List     regular files ending in `.html`, sorted by name
//!  ├─ 2. Read     whole file as UTF-8 (I/O errors retried)
//!  ├─ 3. Convert  engine on its own thread, bounded by a timeout
//!  ├─ 4. Polish   deterministic Markdown cleanup (+ optional front-matter)
//!  └─ 5. Write    temp file + rename into the destination dir (retried)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use h2m_batch::{convert_dir, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BatchConfig::builder()
//!         .source_dir("pages")
//!         .dest_dir("pages/md")
//!         .build()?;
//!     let report = convert_dir(&config).await?;
//!     eprintln!("{} written, {} failed", report.succeeded, report.failed);
//!     report.into_result()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure Policy
//!
//! | Mode | A file fails… |
//! |------|---------------|
//! | [`FailureMode::Resilient`] (default) | it is recorded in the [`BatchReport`]; the rest still run |
//! | [`FailureMode::Strict`] | no further files start; [`H2mError::Aborted`] is returned |
//!
//! An unreadable source directory is fatal in both modes.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `h2m` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BatchConfig, BatchConfigBuilder, FailureMode};
pub use convert::{convert_dir, convert_dir_sync, convert_file, ConversionJob};
pub use error::{H2mError, JobError};
pub use output::{BatchReport, JobOutcome, JobState};
pub use pipeline::html::{ConverterError, Html2MdConverter, MarkdownConverter};
pub use pipeline::list::SourceEntry;
pub use progress::{BatchReporter, LogReporter, NoopReporter, Reporter};
pub use stream::{convert_dir_stream, JobStream};
