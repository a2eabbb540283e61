//! Result aggregation for concurrent per-URL pipelines
//!
//! Each URL of a crawl runs in its own task. Aggregation flattens the
//! successful record lists in submission order and logs every failure with the
//! URL it belongs to, without letting one failure affect its siblings.

use crate::crawler::fetcher::FetchError;
use crate::merch::MerchRecord;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Failure of one per-URL pipeline
#[derive(Debug, Error)]
pub enum CrawlFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The task panicked or was aborted
    #[error("task failed: {0}")]
    Task(String),
}

/// Outcome of one per-URL pipeline
pub type CrawlOutcome = Result<Vec<MerchRecord>, CrawlFailure>;

/// Concatenates successful outcomes in order, logging and dropping failures
///
/// `outcomes` and `urls` must be in the same order; the URL at each position
/// identifies the outcome at that position in log entries.
pub fn aggregate_results<I>(outcomes: I, urls: &[String]) -> Vec<MerchRecord>
where
    I: IntoIterator<Item = CrawlOutcome>,
{
    let mut results = Vec::new();

    for (index, outcome) in outcomes.into_iter().enumerate() {
        let url = urls.get(index).map(String::as_str).unwrap_or("<unknown>");
        match outcome {
            Ok(records) => results.extend(records),
            Err(e) => tracing::error!(url, error = %e, "Failed to scrape url"),
        }
    }

    results
}

/// Awaits spawned pipelines in submission order and aggregates their outcomes
///
/// Completion order has no effect on the result order.
pub async fn gather_results(
    handles: Vec<JoinHandle<CrawlOutcome>>,
    urls: &[String],
) -> Vec<MerchRecord> {
    debug_assert_eq!(handles.len(), urls.len());

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(CrawlFailure::Task(e.to_string())),
        };
        outcomes.push(outcome);
    }

    aggregate_results(outcomes, urls)
}
