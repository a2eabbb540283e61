use crate::config::types::{Config, CrawlerConfig, FetcherConfig, InputConfig};
use crate::ConfigError;

const MAX_RETRIES_LIMIT: u32 = 32;
const MAX_BASE_DELAY_MS: u64 = 600_000;
const MAX_CONCURRENT_FETCHES: u32 = 256;
const MAX_CONCURRENT_LABELS: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_crawler_config(&config.crawler)?;
    validate_input_config(&config.input)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    // base_delay_ms = 0 is accepted; it disables backoff sleeps entirely

    if config.base_delay_ms > MAX_BASE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "base_delay_ms must be <= {}ms, got {}ms",
            MAX_BASE_DELAY_MS, config.base_delay_ms
        )));
    }

    // 2^attempt must stay representable when computing the delay
    if config.max_retries > MAX_RETRIES_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= {}, got {}",
            MAX_RETRIES_LIMIT, config.max_retries
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if let Some(user_agent) = &config.user_agent {
        if user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > MAX_CONCURRENT_FETCHES
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and {}, got {}",
            MAX_CONCURRENT_FETCHES, config.max_concurrent_fetches
        )));
    }

    if config.max_concurrent_labels < 1 || config.max_concurrent_labels > MAX_CONCURRENT_LABELS {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_labels must be between 1 and {}, got {}",
            MAX_CONCURRENT_LABELS, config.max_concurrent_labels
        )));
    }

    Ok(())
}

/// Validates input configuration
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.labels_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "labels_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
