//! Streaming batch API: emit job outcomes as they complete.
//!
//! Unlike the eager [`crate::convert::convert_dir`], which returns only after
//! every file finishes, [`convert_dir_stream`] yields each [`JobOutcome`] as
//! soon as its file is written or fails. With `concurrency > 1` outcomes
//! arrive in completion order, not name order.
//!
//! The stream never stops early: the failure mode is ignored and the caller
//! decides what a failed outcome means by dropping the stream.

use crate::config::BatchConfig;
use crate::convert::{resolve_converter, resolve_reporter, ConversionJob};
use crate::error::H2mError;
use crate::output::JobOutcome;
use crate::pipeline::list;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::info;

/// A boxed stream of job outcomes.
pub type JobStream = Pin<Box<dyn Stream<Item = JobOutcome> + Send>>;

/// List `config.source_dir`, then convert its files lazily as the stream is polled.
///
/// The reporter's `on_batch_start` fires before this returns;
/// `on_batch_complete` is not called since the caller owns the end of the batch.
///
/// # Errors
/// [`H2mError::DirectoryAccess`] when the source directory cannot be listed.
pub async fn convert_dir_stream(config: &BatchConfig) -> Result<JobStream, H2mError> {
    info!("Starting streaming batch: {}", config.source_dir.display());

    let listing = list::list_sources(&config.source_dir, &config.input_extension).await?;
    let converter = resolve_converter(config);
    let reporter = resolve_reporter(config);
    reporter.on_batch_start(listing.entries.len());

    let concurrency = config.concurrency;
    let config = Arc::new(config.clone());

    let s = stream::iter(listing.entries.into_iter().map(move |entry| {
        let config = Arc::clone(&config);
        let converter = Arc::clone(&converter);
        let reporter = Arc::clone(&reporter);
        async move {
            let job = ConversionJob::new(&entry, &config);
            job.run(converter, reporter, &config).await
        }
    }))
    .buffer_unordered(concurrency);

    Ok(Box::pin(s))
}
