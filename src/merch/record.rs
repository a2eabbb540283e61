/// Merch record definition
///
/// A record is one purchasable package (e.g. one vinyl pressing) of one item
/// page, captured at a point in time.
use serde::Serialize;

/// One in-stock purchasable unit of merchandise
///
/// Records are only ever built for packages that are not sold out: `remaining`
/// is either `None` (unlimited) or strictly positive.
///
/// Equality ignores `timestamp`: two captures of the same package with the
/// same commercial attributes compare equal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchRecord {
    pub artist: String,
    pub currency: String,
    /// Total edition size; `None` means unlimited or unspecified
    pub edition_of: Option<i64>,
    pub id: u64,
    pub image_id: u64,
    /// Seller name
    pub label: String,
    pub merch_type: String,
    pub price: f64,
    /// Upstream date string, passed through unmodified
    pub release_date: String,
    /// Units left; `None` means unlimited or unspecified
    pub remaining: Option<i64>,
    /// Capture time (ISO-8601)
    pub timestamp: String,
    pub title: String,
    /// Canonical item page URL
    pub url: String,
}

impl PartialEq for MerchRecord {
    fn eq(&self, other: &Self) -> bool {
        self.artist == other.artist
            && self.currency == other.currency
            && self.edition_of == other.edition_of
            && self.id == other.id
            && self.image_id == other.image_id
            && self.label == other.label
            && self.merch_type == other.merch_type
            && self.price == other.price
            && self.release_date == other.release_date
            && self.remaining == other.remaining
            && self.title == other.title
            && self.url == other.url
    }
}
