//! Output module for publishing crawl results
//!
//! Records are handed to a `RecordSink`; the JSON sink writes them as one
//! array of camelCase objects.

mod json;
mod traits;

pub use json::JsonSink;
pub use traits::{OutputError, OutputResult, RecordSink};
