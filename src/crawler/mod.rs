//! Crawler module for label and item page processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with rate-limit backoff
//! - Listing page link extraction
//! - Item page record extraction
//! - Concurrent crawl coordination and result aggregation

mod aggregator;
mod coordinator;
mod extractor;
mod fetcher;
mod parser;

pub use aggregator::{aggregate_results, gather_results, CrawlFailure, CrawlOutcome};
pub use coordinator::{scrape_item_url, Coordinator};
pub use extractor::{extract_records, try_extract_records, unescape_html, ExtractError};
pub use fetcher::{build_http_client, FetchError, FetchedPage, Fetcher, RetryPolicy};
pub use parser::extract_links;

use crate::config::Config;
use crate::merch::MerchRecord;
use crate::RippleError;

/// Crawls a single label
///
/// Builds a dedicated HTTP client from `config`. Use a `Coordinator` directly
/// to share one client across several calls.
pub async fn crawl_label(config: &Config, seed_url: &str) -> Result<Vec<MerchRecord>, RippleError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.crawl_label(seed_url).await)
}

/// Runs a complete crawl over a list of seed label URLs
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the shared HTTP client
/// 2. Crawl every label concurrently
/// 3. Return the records of all labels in seed order
///
/// # Returns
///
/// * `Ok(Vec<MerchRecord>)` - Crawl completed; individual URL failures are
///   logged and contribute no records
/// * `Err(RippleError)` - The HTTP client could not be built
pub async fn crawl_labels(config: &Config, seeds: &[String]) -> Result<Vec<MerchRecord>, RippleError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.crawl_labels(seeds).await)
}
