//! Crawler coordinator - label crawl orchestration
//!
//! This module sequences the stages of a label crawl:
//! - Fetching the label listing page
//! - Extracting and resolving item page links
//! - Fetching and extracting every item page concurrently
//! - Aggregating the records of all item pages
//!
//! No failure of a single URL ever aborts a crawl; it only costs the records
//! of that URL.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::aggregator::{gather_results, CrawlFailure, CrawlOutcome};
use crate::crawler::extractor::extract_records;
use crate::crawler::fetcher::{build_http_client, Fetcher, RetryPolicy};
use crate::crawler::parser::extract_links;
use crate::merch::MerchRecord;
use crate::url::{base_url_of, resolve_item_url};
use crate::RippleError;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;

/// Main crawler coordinator structure
///
/// Cloning is cheap; clones share the same HTTP connection pool.
#[derive(Debug, Clone)]
pub struct Coordinator {
    fetcher: Fetcher,
    max_concurrent_fetches: usize,
    max_concurrent_labels: usize,
}

impl Coordinator {
    /// Creates a coordinator with its own HTTP client
    pub fn new(config: &Config) -> Result<Self, RippleError> {
        let client = build_http_client(&config.fetcher)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a coordinator around an existing HTTP client
    pub fn with_client(client: Client, config: &Config) -> Self {
        let fetcher = Fetcher::new(client, RetryPolicy::from_config(&config.fetcher));
        Self::with_fetcher(fetcher, &config.crawler)
    }

    pub fn with_fetcher(fetcher: Fetcher, config: &CrawlerConfig) -> Self {
        Self {
            fetcher,
            max_concurrent_fetches: config.max_concurrent_fetches.max(1) as usize,
            max_concurrent_labels: config.max_concurrent_labels.max(1) as usize,
        }
    }

    /// Crawls every seed label concurrently
    ///
    /// Records are returned grouped by seed, in seed order.
    pub async fn crawl_labels(&self, seeds: &[String]) -> Vec<MerchRecord> {
        tracing::info!(labels = seeds.len(), "Starting crawl");

        let limit = Arc::new(Semaphore::new(self.max_concurrent_labels));
        let handles: Vec<JoinHandle<CrawlOutcome>> = seeds
            .iter()
            .map(|seed| {
                let coordinator = self.clone();
                let limit = Arc::clone(&limit);
                let seed = seed.clone();
                tokio::spawn(async move {
                    let _permit = acquire(limit).await?;
                    Ok::<_, CrawlFailure>(coordinator.crawl_label(&seed).await)
                })
            })
            .collect();

        let results = gather_results(handles, seeds).await;
        tracing::info!(records = results.len(), "Finished, found merch items");
        results
    }

    /// Crawls one label listing page and every item page it links to
    ///
    /// # Algorithm
    ///
    /// 1. Fetch the listing page; a terminal failure yields no records
    /// 2. Extract item paths from the listing
    /// 3. If there are paths, resolve them and scrape each item page concurrently
    /// 4. Otherwise scrape the listing URL itself as an item page
    pub async fn crawl_label(&self, seed_url: &str) -> Vec<MerchRecord> {
        tracing::debug!(url = seed_url, "Scraping label url");

        let page = match self.fetcher.fetch(seed_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(url = seed_url, error = %e, "Skipping label");
                return Vec::new();
            }
        };

        let paths = extract_links(&page.body, &page.final_url);
        if paths.is_empty() {
            tracing::info!(url = %page.final_url, "Treating listing page as a single item page");
            return self.scrape_item_urls(vec![page.final_url]).await;
        }

        let base_url = base_url_of(&page.final_url);
        let urls = dedup_preserving_order(paths.iter().map(|path| resolve_item_url(path, base_url)));

        tracing::debug!(url = %page.final_url, items = urls.len(), "Found item pages");
        self.scrape_item_urls(urls).await
    }

    /// Fetches and extracts item pages concurrently, at most
    /// `max_concurrent_fetches` at a time
    async fn scrape_item_urls(&self, urls: Vec<String>) -> Vec<MerchRecord> {
        let limit = Arc::new(Semaphore::new(self.max_concurrent_fetches));
        let handles: Vec<JoinHandle<CrawlOutcome>> = urls
            .iter()
            .map(|url| {
                let fetcher = self.fetcher.clone();
                let limit = Arc::clone(&limit);
                let url = url.clone();
                tokio::spawn(async move {
                    let _permit = acquire(limit).await?;
                    scrape_item_url(&fetcher, &url).await
                })
            })
            .collect();

        gather_results(handles, &urls).await
    }
}

/// Fetches one item page and extracts its records
pub async fn scrape_item_url(fetcher: &Fetcher, url: &str) -> CrawlOutcome {
    tracing::debug!(url, "Scraping item url");
    let page = fetcher.fetch(url).await?;
    let records = extract_records(&page.body, &page.final_url);
    tracing::debug!(url, records = records.len(), "Completed item url");
    Ok(records)
}

async fn acquire(limit: Arc<Semaphore>) -> Result<OwnedSemaphorePermit, CrawlFailure> {
    limit
        .acquire_owned()
        .await
        .map_err(|e| CrawlFailure::Task(e.to_string()))
}

fn dedup_preserving_order<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
