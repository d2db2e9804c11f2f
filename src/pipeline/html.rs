//! The conversion capability: HTML text in, Markdown text out.
//!
//! The engine sits behind [`MarkdownConverter`] so tests and library users
//! can swap it. [`Html2MdConverter`] (the `html2md` crate) is the default.
//! [`run_converter`] drives any engine on its own thread under a timeout,
//! so a hung or panicking engine costs one file, not the batch.

use crate::error::JobError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure reported by a conversion engine.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConverterError(pub String);

/// Turns one HTML document into Markdown.
///
/// Called on a dedicated thread, so implementations may be CPU-heavy or block,
/// and must be `Send + Sync`.
pub trait MarkdownConverter: Send + Sync {
    fn to_markdown(&self, html: &str) -> Result<String, ConverterError>;
}

/// Default engine backed by [`html2md::parse_html`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl MarkdownConverter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> Result<String, ConverterError> {
        Ok(html2md::parse_html(html))
    }
}

type EngineResult = std::thread::Result<Result<String, ConverterError>>;

/// Run `converter` on `html` off the async executor, bounded by `timeout_secs`.
///
/// The engine gets a detached thread rather than a `spawn_blocking` slot:
/// a runtime waits for its blocking tasks on shutdown, a detached thread it
/// never joins. On timeout the thread is left to finish on its own and its
/// result is dropped. `input` only labels errors.
pub async fn run_converter(
    converter: Arc<dyn MarkdownConverter>,
    html: String,
    input: &Path,
    timeout_secs: u64,
) -> Result<String, JobError> {
    let conversion = |detail: String| JobError::Conversion {
        path: input.to_path_buf(),
        detail,
    };

    let (tx, rx) = tokio::sync::oneshot::channel::<EngineResult>();
    std::thread::Builder::new()
        .name("h2m-convert".to_string())
        .spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| converter.to_markdown(&html)));
            // Receiver gone means the job timed out or was cancelled.
            let _ = tx.send(result);
        })
        .map_err(|e| conversion(format!("cannot start converter thread: {e}")))?;

    match tokio::time::timeout(Duration::from_secs(timeout_secs), rx).await {
        Ok(Ok(Ok(Ok(markdown)))) => {
            debug!("Converted {} → {} bytes", input.display(), markdown.len());
            Ok(markdown)
        }
        Ok(Ok(Ok(Err(e)))) => Err(conversion(e.to_string())),
        Ok(Ok(Err(payload))) => Err(conversion(format!(
            "converter panicked: {}",
            panic_message(&*payload)
        ))),
        Ok(Err(_)) => Err(conversion("converter thread exited without a result".to_string())),
        Err(_) => Err(JobError::Timeout {
            path: input.to_path_buf(),
            secs: timeout_secs,
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

static RE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap());
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Text of the document's `<title>` element, whitespace-collapsed, if non-empty.
pub fn extract_title(html: &str) -> Option<String> {
    let raw = RE_TITLE.captures(html)?.get(1)?.as_str();
    let title = decode_basic_entities(RE_WS.replace_all(raw, " ").trim());
    (!title.is_empty()).then_some(title)
}

fn decode_basic_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl MarkdownConverter for Failing {
        fn to_markdown(&self, _html: &str) -> Result<String, ConverterError> {
            Err(ConverterError("unclosed tag soup".into()))
        }
    }

    struct Panicking;

    impl MarkdownConverter for Panicking {
        fn to_markdown(&self, _html: &str) -> Result<String, ConverterError> {
            panic!("engine bug")
        }
    }

    struct Slow;

    impl MarkdownConverter for Slow {
        fn to_markdown(&self, html: &str) -> Result<String, ConverterError> {
            std::thread::sleep(Duration::from_millis(2_500));
            Ok(html.to_string())
        }
    }

    #[test]
    fn html2md_renders_heading_and_body() {
        let md = Html2MdConverter
            .to_markdown("<h1>Title</h1><p>Body</p>")
            .unwrap();
        assert!(md.contains("Title"), "got: {md}");
        assert!(md.contains("Body"), "got: {md}");
        assert!(md.contains('#') || md.contains("==="), "no heading marker: {md}");
    }

    #[tokio::test]
    async fn engine_error_becomes_conversion_error() {
        let err = run_converter(Arc::new(Failing), "<p>x</p>".into(), Path::new("a.html"), 5)
            .await
            .unwrap_err();
        match err {
            JobError::Conversion { detail, .. } => assert!(detail.contains("tag soup")),
            other => panic!("expected Conversion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn engine_panic_is_contained() {
        let err = run_converter(Arc::new(Panicking), String::new(), Path::new("p.html"), 5)
            .await
            .unwrap_err();
        match err {
            JobError::Conversion { detail, .. } => {
                assert_eq!(detail, "converter panicked: engine bug")
            }
            other => panic!("expected Conversion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_engine_times_out() {
        let started = std::time::Instant::now();
        let err = run_converter(Arc::new(Slow), "x".into(), Path::new("slow.html"), 1)
            .await
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_millis(2_000));
        assert_eq!(
            err,
            JobError::Timeout {
                path: "slow.html".into(),
                secs: 1
            }
        );
    }

    #[test]
    fn title_extraction() {
        assert_eq!(
            extract_title("<html><head><TITLE>\n  Tom &amp; Jerry \n</TITLE></head></html>"),
            Some("Tom & Jerry".to_string())
        );
        assert_eq!(extract_title("<title>  </title>"), None);
        assert_eq!(extract_title("<h1>No title</h1>"), None);
    }
}
