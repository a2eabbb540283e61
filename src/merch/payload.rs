/// Typed view of the `data-tralbum` payload embedded in item pages
///
/// Only the keys the crawler reads are declared; everything else in the
/// upstream document is ignored during deserialization.
use serde::Deserialize;

/// Top-level embedded payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TralbumData {
    /// Purchasable packages; a missing or null key means none
    #[serde(default)]
    pub packages: Option<Vec<Package>>,
}

impl TralbumData {
    /// Returns the packages, treating an absent list as empty
    pub fn into_packages(self) -> Vec<Package> {
        self.packages.unwrap_or_default()
    }
}

/// One purchasable edition or format within an item page
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub id: u64,

    /// Units left; `null` means unlimited
    #[serde(default)]
    pub quantity_available: Option<i64>,

    #[serde(default)]
    pub album_artist: Option<String>,

    #[serde(default)]
    pub download_artist: Option<String>,

    pub currency: String,

    #[serde(default)]
    pub edition_size: Option<i64>,

    #[serde(default)]
    pub arts: Vec<Art>,

    pub type_name: String,

    #[serde(default)]
    pub title: Option<String>,

    pub price: f64,

    pub new_date: String,

    #[serde(default)]
    pub album_title: Option<String>,
}

impl Package {
    /// Sold-out packages never become records
    pub fn is_available(&self) -> bool {
        self.quantity_available.map_or(true, |quantity| quantity > 0)
    }

    /// Album artist, falling back to the download artist
    pub fn artist(&self) -> &str {
        non_empty(self.album_artist.as_deref())
            .or_else(|| non_empty(self.download_artist.as_deref()))
            .unwrap_or("")
    }

    /// Album title, falling back to the package title
    pub fn display_title(&self) -> &str {
        non_empty(self.album_title.as_deref())
            .or_else(|| non_empty(self.title.as_deref()))
            .unwrap_or("")
    }

    /// Image id of the first artwork entry
    pub fn image_id(&self) -> Option<u64> {
        self.arts.first().and_then(|art| art.image_id)
    }
}

/// Artwork reference
#[derive(Debug, Clone, Deserialize)]
pub struct Art {
    #[serde(default)]
    pub image_id: Option<u64>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
