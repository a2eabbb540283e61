//! Configuration module for Merch-Ripple
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section and key is optional; a missing file means all defaults.
//!
//! # Example
//!
//! ```no_run
//! use merch_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("merch-ripple.toml")).unwrap();
//! println!("Backoff base: {}ms", config.fetcher.base_delay_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetcherConfig, InputConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
