//! Item page extraction
//!
//! Item pages carry their purchasable packages as JSON inside a
//! `data-tralbum` attribute. This module decodes that payload and turns every
//! package still in stock into a `MerchRecord`.

use crate::merch::{normalize_merch_type, MerchRecord, Package, TralbumData};
use scraper::{Html, Selector};
use thiserror::Error;

const PAYLOAD_ATTRIBUTE: &str = "data-tralbum";

/// Reasons an item page could not be read
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing data-tralbum payload")]
    MissingPayload,

    #[error("invalid data-tralbum payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("package {id} is missing field {field}")]
    MissingField { id: u64, field: &'static str },
}

/// Page-level metadata shared by every record of one page
struct PageContext {
    label: String,
    url: String,
    timestamp: String,
}

/// Extracts the in-stock merch records of an item page
///
/// Never fails: a page without a readable payload is logged and yields no
/// records. Sold-out packages (`quantity_available == 0`) are skipped.
pub fn extract_records(html: &str, page_url: &str) -> Vec<MerchRecord> {
    match try_extract_records(html, page_url) {
        Ok(records) => {
            tracing::debug!(url = page_url, records = records.len(), "Extracted item page");
            records
        }
        Err(e) => {
            tracing::error!(url = page_url, error = %e, "Failed to parse item page");
            Vec::new()
        }
    }
}

/// Extracts the in-stock merch records of an item page, reporting why a page
/// could not be read
pub fn try_extract_records(html: &str, page_url: &str) -> Result<Vec<MerchRecord>, ExtractError> {
    let document = Html::parse_document(html);

    // Attribute values come back from the parser with HTML entities decoded
    let payload = select_attr(&document, "[data-tralbum]", PAYLOAD_ATTRIBUTE)
        .ok_or(ExtractError::MissingPayload)?;
    let data: TralbumData = serde_json::from_str(payload)?;

    let context = PageContext {
        label: unescape_html(
            select_attr(&document, r#"meta[property="og:site_name"]"#, "content").unwrap_or(""),
        ),
        url: unescape_html(
            select_attr(&document, r#"meta[property="og:url"]"#, "content").unwrap_or(page_url),
        ),
        timestamp: capture_timestamp(),
    };

    data.into_packages()
        .iter()
        .filter(|package| package.is_available())
        .map(|package| build_record(package, &context))
        .collect()
}

fn build_record(package: &Package, context: &PageContext) -> Result<MerchRecord, ExtractError> {
    let image_id = package.image_id().ok_or(ExtractError::MissingField {
        id: package.id,
        field: "arts[0].image_id",
    })?;
    let package_title = package.title.as_deref().unwrap_or("");

    Ok(MerchRecord {
        artist: unescape_html(package.artist()),
        currency: unescape_html(&package.currency),
        edition_of: package.edition_size,
        id: package.id,
        image_id,
        label: context.label.clone(),
        merch_type: normalize_merch_type(&unescape_html(&package.type_name), package_title),
        price: package.price,
        release_date: unescape_html(&package.new_date),
        remaining: package.quantity_available,
        timestamp: context.timestamp.clone(),
        title: unescape_html(package.display_title()),
        url: context.url.clone(),
    })
}

fn select_attr<'a>(document: &'a Html, selector: &str, attr: &str) -> Option<&'a str> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .find_map(|element| element.value().attr(attr))
}

fn capture_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Decodes HTML character references (`&amp;`, `&#39;`, `&eacute;`, ...)
///
/// Upstream string values can carry escaped entities even after the JSON
/// itself has been decoded. Carriage returns and NULs are copied through
/// untouched; the HTML parser would otherwise normalize or drop them.
pub fn unescape_html(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(|c: char| c == '\r' || c == '\0') {
        decoded.push_str(&decode_references(&rest[..pos]));
        decoded.push_str(&rest[pos..pos + 1]);
        rest = &rest[pos + 1..];
    }
    decoded.push_str(&decode_references(rest));
    decoded
}

fn decode_references(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    // Escaping `<` keeps the input as a single text node
    let fragment = Html::parse_fragment(&text.replace('<', "&lt;"));
    fragment.root_element().text().collect()
}
