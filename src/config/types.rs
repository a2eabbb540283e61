use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Merch-Ripple
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// HTTP fetching and backoff configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct FetcherConfig {
    /// Backoff base delay in milliseconds; each retry sleeps
    /// `2^attempt * uniform(base * 0.5, base * 1.5)`
    pub base_delay_ms: u64,

    /// Maximum number of retries after an HTTP 429
    pub max_retries: u32,

    /// Per-request timeout (seconds)
    pub request_timeout_secs: u64,

    /// TCP connect timeout (seconds)
    pub connect_timeout_secs: u64,

    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,

    /// Optional User-Agent header; reqwest's default is used when unset
    pub user_agent: Option<String>,
}

impl FetcherConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 2000,
            max_retries: 12,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            accept_invalid_certs: false,
            user_agent: None,
        }
    }
}

/// Crawl fan-out configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Maximum number of item pages fetched at once for a single label
    pub max_concurrent_fetches: u32,

    /// Maximum number of label pages crawled at once
    pub max_concurrent_labels: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 16,
            max_concurrent_labels: 4,
        }
    }
}

/// Seed input configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct InputConfig {
    /// Path to the newline-delimited list of label URLs
    pub labels_path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            labels_path: "resources/labels.txt".to_string(),
        }
    }
}
