use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One product listing scraped from a store's search results, normalized to
/// a uniform shape across retailers.
///
/// Every field except `store` is optional: a missing selector match is an
/// absent field, never a dropped record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Registry identifier of the originating store (e.g. `"farmatodo"`).
    pub store: String,
    pub title: Option<String>,
    /// Price text exactly as found in the source, e.g. `"$ 3.499,00"`.
    pub price_raw: Option<String>,
    /// Normalized numeric price in COP. `None` whenever `price_raw` is
    /// absent or unparseable; never present without `price_raw`.
    pub price: Option<f64>,
    /// Absolute product-page URL. Root-relative hrefs are resolved against
    /// the store's base URL before the record is built.
    pub link: Option<String>,
    /// Product image URL, absolute or protocol-relative.
    pub img: Option<String>,
}

impl ListingRecord {
    /// Returns `true` if normalization produced a comparable price.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }
}

/// Ordered listings for a single store, in source-document order, length
/// capped by the caller's `max_per_store`.
pub type StoreQueryResult = Vec<ListingRecord>;

/// Mapping from store identifier to its listings. Every requested store is
/// present as a key, with an empty sequence for failed or empty stores.
pub type AggregateResult = BTreeMap<String, StoreQueryResult>;

/// Returns the cheapest priced record in `records`, ignoring records whose
/// price could not be normalized. Ties keep the earliest record.
#[must_use]
pub fn best_priced(records: &[ListingRecord]) -> Option<&ListingRecord> {
    records
        .iter()
        .filter(|r| r.price.is_some())
        .min_by(|a, b| {
            a.price
                .partial_cmp(&b.price)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
