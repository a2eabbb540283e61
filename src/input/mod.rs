//! Seed input module
//!
//! Label URLs are read from a newline-delimited text file. Blank lines and
//! lines starting with `#` are skipped; every other line must be an absolute
//! http(s) URL.

use crate::url::parse_seed_url;
use std::path::Path;

/// Reads the seed label URLs from a file
///
/// # Example
///
/// ```no_run
/// use merch_ripple::input::read_label_urls;
/// use std::path::Path;
///
/// let seeds = read_label_urls(Path::new("resources/labels.txt")).unwrap();
/// println!("{} labels to crawl", seeds.len());
/// ```
pub fn read_label_urls(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_label_urls(&content))
}

/// Parses newline-delimited label URLs, preserving order
///
/// Lines that are not valid http(s) URLs are logged and skipped.
pub fn parse_label_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match parse_seed_url(line) {
            Ok(_) => Some(line.to_string()),
            Err(e) => {
                tracing::warn!(line, error = %e, "Skipping invalid label url");
                None
            }
        })
        .collect()
}
