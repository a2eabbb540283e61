/// Returns true if `path` is already an absolute `http://` or `https://` URL
pub fn is_absolute_http_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Returns the prefix of a page URL up to (not including) its last `/`
///
/// Listing paths are appended to this prefix.
///
/// ```
/// use merch_ripple::url::base_url_of;
///
/// assert_eq!(base_url_of("https://label.example.com/merch"), "https://label.example.com");
/// assert_eq!(base_url_of("https://label.example.com/merch/"), "https://label.example.com/merch");
/// ```
pub fn base_url_of(page_url: &str) -> &str {
    match page_url.rfind('/') {
        Some(index) => &page_url[..index],
        None => page_url,
    }
}

/// Resolves a listing path against a base URL
///
/// - absolute `http(s)://` paths are returned as-is
/// - a leading `/merch` segment is dropped when the base already ends with `/merch`
/// - anything else is appended to the base
pub fn resolve_item_url(path: &str, base_url: &str) -> String {
    if is_absolute_http_url(path) {
        return path.to_string();
    }

    let path = match path.strip_prefix("/merch") {
        Some(rest) if base_url.ends_with("/merch") => rest,
        _ => path,
    };

    format!("{}{}", base_url, path)
}
