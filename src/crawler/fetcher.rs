//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared, connection-pooled HTTP client
//! - Classifying response status codes
//! - Exponential backoff with jitter on rate limiting

use crate::config::FetcherConfig;
use rand::Rng;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Page body decoded as UTF-8
    pub body: String,

    /// Final URL after redirects
    pub final_url: String,
}

/// Terminal outcome of a failed fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Not found: {url}")]
    NotFound { url: String },

    #[error("Rate limited at {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("Unexpected HTTP status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("HTTP error for {url}: {source}")]
    Network { url: String, source: reqwest::Error },
}

impl FetchError {
    /// The URL the failed request was made to
    pub fn url(&self) -> &str {
        match self {
            Self::NotFound { url }
            | Self::RateLimited { url, .. }
            | Self::UnexpectedStatus { url, .. }
            | Self::Network { url, .. } => url,
        }
    }
}

/// Backoff behavior for HTTP 429 responses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Base delay; retry `n` sleeps `2^n * uniform(base * 0.5, base * 1.5)`
    pub base_delay: Duration,

    /// Retries allowed before giving up
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_retries: u32) -> Self {
        Self {
            base_delay,
            max_retries,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(config.base_delay(), config.max_retries)
    }

    /// Inclusive bounds of the delay before retry number `attempt`
    pub fn delay_bounds(&self, attempt: u32) -> (Duration, Duration) {
        let (low, high) = self.jitter_range();
        let factor = backoff_factor(attempt);
        (
            Duration::from_secs_f64(factor * low),
            Duration::from_secs_f64(factor * high),
        )
    }

    /// Computes the delay before retry number `attempt` using the thread RNG
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_delay_with(attempt, &mut rand::thread_rng())
    }

    /// Computes the delay before retry number `attempt` using `rng` for jitter
    pub fn backoff_delay_with<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let (low, high) = self.jitter_range();
        let jitter = if high > low {
            rng.gen_range(low..=high)
        } else {
            low
        };
        Duration::from_secs_f64(backoff_factor(attempt) * jitter)
    }

    fn jitter_range(&self) -> (f64, f64) {
        let base = self.base_delay.as_secs_f64();
        (base * 0.5, base * 1.5)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetcherConfig::default())
    }
}

fn backoff_factor(attempt: u32) -> f64 {
    2f64.powi(attempt as i32)
}

/// Builds the HTTP client shared by every fetch of a run
///
/// Redirects are followed so the fetched page reports its final URL.
/// `Client` is internally reference counted and safe for concurrent use.
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true);

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    builder.build()
}

/// Performs GET requests with status classification and rate-limit retries
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL, retrying on rate limiting
    ///
    /// # Status Handling
    ///
    /// | Status | Action |
    /// |--------|--------|
    /// | 200 | Return body and final URL |
    /// | 404 | Immediate → NotFound |
    /// | 429 | Back off and retry, up to `max_retries` → RateLimited |
    /// | other | Immediate → UnexpectedStatus |
    ///
    /// Transport errors are returned as `Network` without retrying.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let mut attempt: u32 = 0;

        loop {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|source| network_error(url, source))?;
            let status = response.status();

            match status {
                StatusCode::OK => {
                    let final_url = response.url().to_string();
                    let bytes = response
                        .bytes()
                        .await
                        .map_err(|source| network_error(url, source))?;
                    tracing::debug!(url, final_url = %final_url, "Fetched page");

                    return Ok(FetchedPage {
                        body: String::from_utf8_lossy(&bytes).into_owned(),
                        final_url,
                    });
                }
                StatusCode::NOT_FOUND => {
                    tracing::error!(url, status = status.as_u16(), "Failed to reach url");
                    return Err(FetchError::NotFound {
                        url: url.to_string(),
                    });
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    // Release the pooled connection before backing off
                    drop(response);

                    if attempt >= self.policy.max_retries {
                        tracing::error!(
                            url,
                            status = status.as_u16(),
                            attempts = attempt + 1,
                            "Rate limited, retries exhausted, skipping"
                        );
                        return Err(FetchError::RateLimited {
                            url: url.to_string(),
                            attempts: attempt + 1,
                        });
                    }

                    attempt += 1;
                    let delay = self.policy.backoff_delay(attempt);
                    tracing::warn!(
                        url,
                        status = status.as_u16(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, pending retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                _ => {
                    tracing::error!(url, status = status.as_u16(), "Unexpected status, skipping");
                    return Err(FetchError::UnexpectedStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
            }
        }
    }
}

fn network_error(url: &str, source: reqwest::Error) -> FetchError {
    tracing::error!(url, error = %source, "Request failed");
    FetchError::Network {
        url: url.to_string(),
        source,
    }
}
