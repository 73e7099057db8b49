//! Field extraction from listing cards.
//!
//! A card is one product fragment inside a search-results document. Each
//! field (title, price text, link, image) is located by an ordered list of
//! candidates; the first candidate that matches an element inside the card
//! and yields a non-empty value wins. A field with no winner is simply
//! absent. Extraction never fails a scrape.

use farmaprice_core::stores::{FieldCandidate, FieldRules};
use scraper::{ElementRef, Selector};

/// Raw field values pulled out of one card, before price normalization.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub title: Option<String>,
    pub price_raw: Option<String>,
    pub link: Option<String>,
    pub img: Option<String>,
}

/// Extract the configured fields from one card.
///
/// Link and image values are resolved against `base_url` so callers always
/// see usable URLs.
#[must_use]
pub fn extract_card(card: ElementRef<'_>, rules: &FieldRules, base_url: &str) -> CardFields {
    CardFields {
        title: first_match(card, &rules.title),
        price_raw: first_match(card, &rules.price),
        link: first_match(card, &rules.link).map(|v| resolve_url(base_url, &v)),
        img: first_match(card, &rules.image).map(|v| resolve_url(base_url, &v)),
    }
}

/// Walk a field's candidate list against the card subtree.
///
/// Candidates run in declaration order. For each one, every descendant the
/// selector matches is considered in document order; the first non-empty
/// trimmed value ends the search. Unparseable selectors are skipped so one
/// bad config entry cannot sink the rest of the list.
#[must_use]
pub fn first_match(card: ElementRef<'_>, candidates: &[FieldCandidate]) -> Option<String> {
    for candidate in candidates {
        let Ok(selector) = Selector::parse(&candidate.selector) else {
            tracing::debug!(selector = %candidate.selector, "skipping unparseable field selector");
            continue;
        };

        for element in card.select(&selector) {
            let value = match &candidate.attr {
                Some(attr) => element.value().attr(attr).map(str::to_owned),
                None => Some(element_text(element)),
            };
            if let Some(value) = value {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }
    None
}

/// Resolve a possibly root-relative URL against a store's base URL.
///
/// Root-relative values (`/medicamentos/p`) are prefixed with the base;
/// protocol-relative (`//cdn...`) and fully qualified values pass through
/// unchanged.
#[must_use]
pub fn resolve_url(base_url: &str, value: &str) -> String {
    if value.starts_with("//") || !value.starts_with('/') {
        value.to_string()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), value)
    }
}

/// Visible text of an element with inter-node whitespace collapsed.
///
/// Storefronts love to split one price across nested spans; joining the
/// text nodes with single spaces keeps `$28.900` readable as one value.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
