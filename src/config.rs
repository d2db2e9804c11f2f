//! Configuration types for batch HTML-to-Markdown conversion.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. The defaults reproduce the original tool's fixed
//! layout: HTML pages in `../data/pages`, Markdown written to
//! `../data/pages/md`.

use crate::error::H2mError;
use crate::pipeline::html::MarkdownConverter;
use crate::progress::BatchReporter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default directory scanned for HTML input.
pub const DEFAULT_SOURCE_DIR: &str = "../data/pages";
/// Default directory receiving Markdown output.
pub const DEFAULT_DEST_DIR: &str = "../data/pages/md";

/// Configuration for one batch run.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use h2m_batch::{BatchConfig, FailureMode};
///
/// let config = BatchConfig::builder()
///     .source_dir("site/pages")
///     .dest_dir("site/md")
///     .mode(FailureMode::Strict)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct BatchConfig {
    /// Directory scanned for input files. Default: `../data/pages`.
    pub source_dir: PathBuf,

    /// Pre-existing directory receiving output files. Default: `../data/pages/md`.
    ///
    /// Never created by the batch; a missing directory makes every write fail.
    pub dest_dir: PathBuf,

    /// Suffix an entry name must end with to be converted (case-sensitive). Default: `.html`.
    pub input_extension: String,

    /// Suffix appended to the stem of each output file. Default: `.md`.
    pub output_extension: String,

    /// What a single failed file does to the rest of the batch. Default: [`FailureMode::Resilient`].
    pub mode: FailureMode,

    /// Number of files processed at once. Default: 1 (sequential).
    pub concurrency: usize,

    /// Upper bound on one converter call, in seconds. Default: 30.
    pub convert_timeout_secs: u64,

    /// Retry attempts on a read or write failure. Default: 2.
    ///
    /// Conversion failures are never retried.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 100.
    pub retry_backoff_ms: u64,

    /// Prepend YAML front-matter (title, source file). Default: false.
    pub include_metadata: bool,

    /// Normalise converter output (line endings, blank lines, final newline). Default: true.
    pub postprocess: bool,

    /// Conversion engine. If None, uses [`crate::pipeline::html::Html2MdConverter`].
    pub converter: Option<Arc<dyn MarkdownConverter>>,

    /// Observer for per-file events. If None, uses [`crate::progress::LogReporter`].
    pub reporter: Option<Arc<dyn BatchReporter>>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            dest_dir: PathBuf::from(DEFAULT_DEST_DIR),
            input_extension: ".html".to_string(),
            output_extension: ".md".to_string(),
            mode: FailureMode::default(),
            concurrency: 1,
            convert_timeout_secs: 30,
            max_retries: 2,
            retry_backoff_ms: 100,
            include_metadata: false,
            postprocess: true,
            converter: None,
            reporter: None,
        }
    }
}

impl fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchConfig")
            .field("source_dir", &self.source_dir)
            .field("dest_dir", &self.dest_dir)
            .field("input_extension", &self.input_extension)
            .field("output_extension", &self.output_extension)
            .field("mode", &self.mode)
            .field("concurrency", &self.concurrency)
            .field("convert_timeout_secs", &self.convert_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("include_metadata", &self.include_metadata)
            .field("postprocess", &self.postprocess)
            .field("converter", &self.converter.as_ref().map(|_| "<dyn MarkdownConverter>"))
            .field("reporter", &self.reporter.as_ref().map(|_| "<dyn BatchReporter>"))
            .finish()
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Output path for the given stem: `dest_dir/<stem><output_extension>`.
    pub fn output_path_for(&self, stem: &str) -> PathBuf {
        self.dest_dir
            .join(format!("{}{}", stem, self.output_extension))
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.source_dir = dir.into();
        self
    }

    pub fn dest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.dest_dir = dir.into();
        self
    }

    pub fn input_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.input_extension = ext.into();
        self
    }

    pub fn output_extension(mut self, ext: impl Into<String>) -> Self {
        self.config.output_extension = ext.into();
        self
    }

    pub fn mode(mut self, mode: FailureMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn convert_timeout_secs(mut self, secs: u64) -> Self {
        self.config.convert_timeout_secs = secs;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn include_metadata(mut self, v: bool) -> Self {
        self.config.include_metadata = v;
        self
    }

    pub fn postprocess(mut self, v: bool) -> Self {
        self.config.postprocess = v;
        self
    }

    pub fn converter(mut self, converter: Arc<dyn MarkdownConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn BatchReporter>) -> Self {
        self.config.reporter = Some(reporter);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, H2mError> {
        let c = &self.config;
        validate_extension("input", &c.input_extension)?;
        validate_extension("output", &c.output_extension)?;
        if c.concurrency == 0 {
            return Err(H2mError::InvalidConfig("Concurrency must be ≥ 1".into()));
        }
        if c.convert_timeout_secs == 0 {
            return Err(H2mError::InvalidConfig(
                "Conversion timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

fn validate_extension(which: &str, ext: &str) -> Result<(), H2mError> {
    if ext.len() < 2 || !ext.starts_with('.') {
        return Err(H2mError::InvalidConfig(format!(
            "{which} extension must start with '.' and be non-empty, got {ext:?}"
        )));
    }
    if ext.contains('/') || ext.contains('\\') {
        return Err(H2mError::InvalidConfig(format!(
            "{which} extension must not contain a path separator, got {ext:?}"
        )));
    }
    Ok(())
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Failure policy for per-file errors.
///
/// Source-directory errors are always fatal regardless of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailureMode {
    /// The first failed file stops the batch; no further files are started.
    Strict,
    /// Failed files are recorded and the batch carries on. (default)
    #[default]
    Resilient,
}
