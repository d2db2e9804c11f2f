//! CLI binary for h2m-batch.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use h2m_batch::{
    convert_dir, BatchConfig, BatchReporter, FailureMode, JobError, NoopReporter, Reporter,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI reporter using indicatif ─────────────────────────────────────────────

/// Terminal reporter: a live progress bar plus one line per output written
/// or file failed. Lines may arrive out of order with `--concurrency > 1`.
struct CliReporter {
    bar: ProgressBar,
}

impl CliReporter {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} files  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl BatchReporter for CliReporter {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} files…"))
        ));
    }

    fn on_file_start(&self, input: &Path) {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_file_written(&self, _input: &Path, output: &Path, markdown_len: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            output.display(),
            dim(&format!("{markdown_len} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, error: &JobError) {
        self.bar.println(format!("  {} {}", red("✗"), red(&error.to_string())));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        self.bar.finish_and_clear();
        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {} files converted  ({} failed)",
                if succeeded == 0 { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert ../data/pages/*.html into ../data/pages/md/*.md
  h2m

  # Explicit directories
  h2m --source site/pages --dest site/md

  # Stop at the first failing file
  h2m --strict

  # Four files at a time, YAML front-matter, JSON report on stdout
  h2m -c 4 --metadata --json > report.json

EXIT STATUS:
  0  every listed file was converted (including an empty source directory)
  1  the source directory could not be read, a file failed, or --strict aborted

LOGGING:
  RUST_LOG overrides the log filter chosen by --verbose / --quiet
"#;

/// Batch-convert a directory of HTML files to Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "h2m",
    version,
    about = "Batch-convert a directory of HTML files to Markdown",
    long_about = "Converts every <stem>.html in the source directory to <stem>.md in the \
destination directory. The destination directory must already exist; existing outputs \
are overwritten.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the HTML files.
    #[arg(short, long, default_value = h2m_batch::config::DEFAULT_SOURCE_DIR)]
    source: PathBuf,

    /// Existing directory receiving the Markdown files.
    #[arg(short, long, default_value = h2m_batch::config::DEFAULT_DEST_DIR)]
    dest: PathBuf,

    /// Input file suffix (case-sensitive).
    #[arg(long, default_value = ".html")]
    input_ext: String,

    /// Output file suffix.
    #[arg(long, default_value = ".md")]
    output_ext: String,

    /// Abort the batch on the first failing file.
    #[arg(long)]
    strict: bool,

    /// Number of files converted at once.
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,

    /// Per-file conversion timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Retries per file on read/write failure.
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Prepend YAML front-matter (title, source file).
    #[arg(long)]
    metadata: bool,

    /// Write converter output as-is, without Markdown cleanup.
    #[arg(long)]
    no_postprocess: bool,

    /// Print the batch report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar prints per-file lines itself; keep INFO library logs
    // out of its way.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let reporter: Option<Reporter> = if show_progress {
        Some(CliReporter::new() as Reporter)
    } else if cli.quiet {
        Some(Arc::new(NoopReporter) as Reporter)
    } else {
        // Library default: LogReporter via tracing.
        None
    };

    let config = build_config(&cli, reporter)?;

    // ── Run batch ────────────────────────────────────────────────────────
    let report = convert_dir(&config).await.context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        eprintln!(
            "Converted {}/{} files in {}ms ({} skipped)",
            report.succeeded,
            report.total(),
            report.total_duration_ms,
            report.skipped
        );
    }

    report
        .into_result()
        .context("Some files could not be converted")?;
    Ok(())
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, reporter: Option<Reporter>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .source_dir(&cli.source)
        .dest_dir(&cli.dest)
        .input_extension(&cli.input_ext)
        .output_extension(&cli.output_ext)
        .mode(if cli.strict {
            FailureMode::Strict
        } else {
            FailureMode::Resilient
        })
        .concurrency(cli.concurrency)
        .convert_timeout_secs(cli.timeout)
        .max_retries(cli.max_retries)
        .include_metadata(cli.metadata)
        .postprocess(!cli.no_postprocess);

    if let Some(r) = reporter {
        builder = builder.reporter(r);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_arguments_use_defaults() {
        let cli = Cli::try_parse_from(["h2m"]).unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.source_dir, PathBuf::from("../data/pages"));
        assert_eq!(config.dest_dir, PathBuf::from("../data/pages/md"));
        assert_eq!(config.mode, FailureMode::Resilient);
    }

    #[test]
    fn strict_flag_selects_strict_mode() {
        let cli = Cli::try_parse_from(["h2m", "--strict", "-s", "in", "-d", "out", "-c", "3"])
            .unwrap();
        let config = build_config(&cli, None).unwrap();
        assert_eq!(config.mode, FailureMode::Strict);
        assert_eq!(config.source_dir, PathBuf::from("in"));
        assert_eq!(config.concurrency, 3);
    }

    #[test]
    fn environment_does_not_override_defaults() {
        std::env::set_var("H2M_SOURCE", "from-env");
        let cli = Cli::try_parse_from(["h2m"]).unwrap();
        std::env::remove_var("H2M_SOURCE");
        assert_eq!(cli.source, PathBuf::from(h2m_batch::config::DEFAULT_SOURCE_DIR));
    }

    #[test]
    fn bad_extension_is_rejected() {
        let cli = Cli::try_parse_from(["h2m", "--input-ext", "html"]).unwrap();
        assert!(build_config(&cli, None).is_err());
    }
}
