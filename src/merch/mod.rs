//! Merchandise data model
//!
//! This module defines:
//! - `MerchRecord`, the normalized output unit of a crawl
//! - The typed shape of the JSON payload embedded in item pages
//! - Merch type normalization rules

mod merch_type;
mod payload;
mod record;

pub use merch_type::normalize_merch_type;
pub use payload::{Art, Package, TralbumData};
pub use record::MerchRecord;
