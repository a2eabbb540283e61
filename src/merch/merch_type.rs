use regex::Regex;
use std::sync::LazyLock;

static VINYL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bvinyl\b").expect("valid vinyl pattern"));
static FLOPPY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)floppy").expect("valid floppy pattern"));
static MINIDISC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mini\s*disc").expect("valid minidisc pattern"));

/// Normalizes an upstream package type into a merch category
///
/// Rules apply in order, later ones overriding earlier ones:
/// 1. a type naming "vinyl" as a whole word becomes `Vinyl`
/// 2. a title mentioning "floppy" becomes `Floppy`
/// 3. otherwise a title mentioning "minidisc"/"mini disc" becomes `Minidisc`
///
/// Anything else passes through unchanged.
pub fn normalize_merch_type(raw_type: &str, title: &str) -> String {
    if FLOPPY.is_match(title) {
        "Floppy".to_string()
    } else if MINIDISC.is_match(title) {
        "Minidisc".to_string()
    } else if VINYL.is_match(raw_type) {
        "Vinyl".to_string()
    } else {
        raw_type.to_string()
    }
}
