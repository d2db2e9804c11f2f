//! Batch orchestration: list, then read → convert → write each file.
//!
//! Each listed file becomes a [`ConversionJob`] that owns its paths and
//! content and ends in a [`JobOutcome`]. Jobs share nothing but the
//! destination directory, and each writes a distinct path, so up to
//! `concurrency` of them run at once without locking.
//!
//! The [`FailureMode`] decides what a failed job does to the batch: strict
//! mode stops scheduling new jobs and returns [`H2mError::Aborted`];
//! resilient mode records the failure and carries on.

use crate::config::{BatchConfig, FailureMode};
use crate::error::{H2mError, JobError};
use crate::output::{BatchReport, JobOutcome, JobState};
use crate::pipeline::html::{self, Html2MdConverter, MarkdownConverter};
use crate::pipeline::list::{self, SourceEntry};
use crate::pipeline::{postprocess, read, write};
use crate::progress::{BatchReporter, LogReporter};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Convert every `<stem><input_extension>` file in `config.source_dir`.
///
/// # Returns
/// `Ok(BatchReport)` once every file has been attempted, even if some
/// failed (check `report.failed`, or call [`BatchReport::into_result`]).
///
/// # Errors
/// - [`H2mError::DirectoryAccess`]: the source directory cannot be listed
/// - [`H2mError::Aborted`]: strict mode and a file failed
pub async fn convert_dir(config: &BatchConfig) -> Result<BatchReport, H2mError> {
    let total_start = Instant::now();
    info!(
        "Starting batch: {} → {}",
        config.source_dir.display(),
        config.dest_dir.display()
    );

    let listing = list::list_sources(&config.source_dir, &config.input_extension).await?;
    let converter = resolve_converter(config);
    let reporter = resolve_reporter(config);
    reporter.on_batch_start(listing.entries.len());

    let mut running = stream::iter(listing.entries.iter().map(|entry| {
        let job = ConversionJob::new(entry, config);
        let converter = Arc::clone(&converter);
        let reporter = Arc::clone(&reporter);
        async move { job.run(converter, reporter, config).await }
    }))
    .buffer_unordered(config.concurrency);

    let mut outcomes = Vec::with_capacity(listing.entries.len());
    while let Some(outcome) = running.next().await {
        if config.mode == FailureMode::Strict {
            if let Some(error) = outcome.error.clone() {
                // Returning drops the stream, cancelling jobs still in flight.
                let succeeded = outcomes.len();
                reporter.on_batch_complete(succeeded, 1);
                warn!("Strict mode: aborting after {} files written", succeeded);
                return Err(H2mError::Aborted { error });
            }
        }
        outcomes.push(outcome);
    }

    let report = BatchReport::from_outcomes(
        outcomes,
        listing.skipped,
        total_start.elapsed().as_millis() as u64,
    );
    reporter.on_batch_complete(report.succeeded, report.failed);
    info!(
        "Batch complete: {}/{} files, {} skipped, {}ms",
        report.succeeded,
        report.total(),
        report.skipped,
        report.total_duration_ms
    );
    Ok(report)
}

/// Synchronous wrapper around [`convert_dir`].
///
/// Creates a temporary tokio runtime internally. A converter that timed out
/// runs on a detached thread, so dropping the runtime does not wait for it.
pub fn convert_dir_sync(config: &BatchConfig) -> Result<BatchReport, H2mError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| H2mError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_dir(config))
}

/// Convert a single HTML file to `output`, outside any directory scan.
///
/// Uses the converter, retry and post-processing settings of `config`;
/// the directory and extension settings are ignored.
pub async fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &BatchConfig,
) -> Result<JobOutcome, JobError> {
    let input = input.as_ref();
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let job = ConversionJob {
        name,
        input_path: input.to_path_buf(),
        output_path: output.as_ref().to_path_buf(),
        state: JobState::Listed,
    };
    let outcome = job
        .run(resolve_converter(config), resolve_reporter(config), config)
        .await;
    match outcome.error {
        Some(e) => Err(e),
        None => Ok(outcome),
    }
}

// ── Jobs ─────────────────────────────────────────────────────────────────

/// One file's trip through the pipeline.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Entry name, used for front-matter.
    pub name: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub state: JobState,
}

impl ConversionJob {
    pub fn new(entry: &SourceEntry, config: &BatchConfig) -> Self {
        Self {
            name: entry.name.clone(),
            input_path: entry.path.clone(),
            output_path: config.output_path_for(&entry.stem),
            state: JobState::Listed,
        }
    }

    /// Run the job to completion. Never fails: errors land in the outcome.
    pub async fn run(
        mut self,
        converter: Arc<dyn MarkdownConverter>,
        reporter: Arc<dyn BatchReporter>,
        config: &BatchConfig,
    ) -> JobOutcome {
        let start = Instant::now();
        reporter.on_file_start(&self.input_path);

        let mut retries = 0;
        let result = self.execute(converter, config, &mut retries).await;

        let (markdown_len, error) = match result {
            Ok(len) => {
                self.advance(JobState::Done);
                reporter.on_file_written(&self.input_path, &self.output_path, len);
                (len, None)
            }
            Err(e) => {
                debug!("{} failed after reaching {:?}", self.name, self.state);
                self.state = JobState::Failed;
                reporter.on_file_error(&e);
                (0, Some(e))
            }
        };

        JobOutcome {
            input_path: self.input_path,
            output_path: self.output_path,
            state: self.state,
            markdown_len,
            retries,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
        }
    }

    async fn execute(
        &mut self,
        converter: Arc<dyn MarkdownConverter>,
        config: &BatchConfig,
        retries: &mut u32,
    ) -> Result<usize, JobError> {
        let input = self.input_path.clone();
        let html = with_retry(config, retries, || read::read_html(&input)).await?;
        self.advance(JobState::Read);

        let title = if config.include_metadata {
            html::extract_title(&html)
        } else {
            None
        };
        let markdown =
            html::run_converter(converter, html, &input, config.convert_timeout_secs).await?;
        self.advance(JobState::Converted);

        let document = render_document(markdown, title.as_deref(), &self.name, config);
        let len = document.len();
        let output = self.output_path.clone();
        with_retry(config, retries, || write::write_markdown(&output, document.clone())).await?;
        self.advance(JobState::Written);

        Ok(len)
    }

    fn advance(&mut self, next: JobState) {
        debug!("{}: {:?} → {:?}", self.name, self.state, next);
        self.state = next;
    }
}

// ── Internal helpers ─────────────────────────────────────────────────────

pub(crate) fn resolve_converter(config: &BatchConfig) -> Arc<dyn MarkdownConverter> {
    match config.converter {
        Some(ref c) => Arc::clone(c),
        None => Arc::new(Html2MdConverter),
    }
}

pub(crate) fn resolve_reporter(config: &BatchConfig) -> Arc<dyn BatchReporter> {
    match config.reporter {
        Some(ref r) => Arc::clone(r),
        None => Arc::new(LogReporter),
    }
}

/// Retry transient I/O failures with exponential backoff
/// (`retry_backoff_ms * 2^(attempt-1)`). Non-retryable errors return at once.
async fn with_retry<T, F, Fut>(
    config: &BatchConfig,
    retries: &mut u32,
    mut op: F,
) -> Result<T, JobError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, JobError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                attempt += 1;
                *retries += 1;
                let backoff = config
                    .retry_backoff_ms
                    .saturating_mul(1u64 << (attempt - 1).min(16));
                warn!(
                    "{}: retry {}/{} after {}ms",
                    e, attempt, config.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Final file content: optional front-matter plus (optionally cleaned) Markdown.
fn render_document(
    markdown: String,
    title: Option<&str>,
    source_name: &str,
    config: &BatchConfig,
) -> String {
    let body = if config.postprocess {
        postprocess::clean_markdown(&markdown)
    } else {
        markdown
    };

    if config.include_metadata {
        format!("{}{}", format_yaml_front_matter(title, source_name), body)
    } else {
        body
    }
}

/// Format document metadata as YAML front matter.
fn format_yaml_front_matter(title: Option<&str>, source_name: &str) -> String {
    let mut yaml = String::from("---\n");
    if let Some(t) = title {
        yaml.push_str(&format!("title: \"{}\"\n", yaml_escape(t)));
    }
    yaml.push_str(&format!("source: \"{}\"\n", yaml_escape(source_name)));
    yaml.push_str("---\n\n");
    yaml
}

fn yaml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
