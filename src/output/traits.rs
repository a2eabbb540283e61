//! Output sink traits and types
//!
//! This module defines the trait interface for consumers of crawl results.

use crate::merch::MerchRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A consumer of extracted merch records
pub trait RecordSink {
    /// Writes one complete batch of records
    fn write_records(&mut self, records: &[MerchRecord]) -> OutputResult<()>;
}
