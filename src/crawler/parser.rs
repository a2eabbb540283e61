//! Listing page parser
//!
//! This module extracts links to item pages from a label's merch listing.
//!
//! A listing entry qualifies when it is an `<li>` that:
//! - carries a `merch-grid-item` or `featured-item` class
//! - has a `<div>` child with a `merchtype` class
//! - has a `<p>` child with a `price` class that is not `sold-out`
//!
//! The link is the `href` of its `<a>` child wrapping a `<div class="art">`.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

const ITEM_CLASSES: [&str; 2] = ["merch-grid-item", "featured-item"];

/// Extracts the unique item paths of a listing page, in document order
///
/// Paths are returned exactly as written in the markup; they may be relative.
/// An empty result is logged as a warning but is not an error: the caller
/// decides whether to treat the page as an item page instead.
///
/// # Example
///
/// ```
/// use merch_ripple::crawler::extract_links;
///
/// let html = r#"<ul><li class="merch-grid-item">
///     <a href="/album/one"><div class="art"></div></a>
///     <div class="merchtype">Cassette</div>
///     <p class="price">$15</p>
/// </li></ul>"#;
/// assert_eq!(extract_links(html, "https://label.example.com/merch"), vec!["/album/one"]);
/// ```
pub fn extract_links(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if let Ok(li_selector) = Selector::parse("li") {
        for item in document.select(&li_selector) {
            if !is_available_listing_item(&item) {
                continue;
            }

            if let Some(href) = item_href(&item) {
                if seen.insert(href.to_string()) {
                    links.push(href.to_string());
                }
            }
        }
    }

    if links.is_empty() {
        tracing::warn!(url = page_url, "No merch items found on listing page");
    }

    links
}

/// Checks the class and child structure of a listing `<li>`
fn is_available_listing_item(item: &ElementRef) -> bool {
    let Some(class) = item.value().attr("class") else {
        return false;
    };
    if !ITEM_CLASSES.iter().any(|needle| class.contains(needle)) {
        return false;
    }

    let has_merch_type = child_elements(item)
        .any(|child| child.value().name() == "div" && class_contains(&child, "merchtype"));

    let has_available_price = child_elements(item).any(|child| {
        child.value().name() == "p"
            && class_contains(&child, "price")
            && !class_contains(&child, "sold-out")
    });

    has_merch_type && has_available_price
}

/// Returns the `href` of the `<a>` child that wraps the item artwork
fn item_href<'a>(item: &ElementRef<'a>) -> Option<&'a str> {
    child_elements(item)
        .filter(|child| child.value().name() == "a")
        .find(|anchor| {
            child_elements(anchor)
                .any(|inner| inner.value().name() == "div" && inner.value().attr("class") == Some("art"))
        })
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
}

fn child_elements<'a>(element: &ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

fn class_contains(element: &ElementRef, needle: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| class.contains(needle))
}
