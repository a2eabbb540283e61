//! URL handling module for Merch-Ripple
//!
//! This module provides seed URL validation and the resolution of listing
//! paths into absolute item page URLs.

mod resolve;

use crate::UrlError;
use url::Url;

pub use resolve::{base_url_of, is_absolute_http_url, resolve_item_url};

/// Parses and validates a seed label URL
///
/// Seeds must be absolute `http` or `https` URLs with a host.
///
/// # Examples
///
/// ```
/// use merch_ripple::url::parse_seed_url;
///
/// assert!(parse_seed_url("https://label.example.com/merch").is_ok());
/// assert!(parse_seed_url("ftp://label.example.com/").is_err());
/// ```
pub fn parse_seed_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    Ok(url)
}
