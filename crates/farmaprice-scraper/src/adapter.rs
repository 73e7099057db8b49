//! Config-driven store adapter.
//!
//! One pipeline serves every retailer: build the search URL from the
//! store's template, fetch the document through whatever transport was
//! injected, then extract listings either from HTML cards or from a
//! structured JSON payload. Everything retailer-specific lives in the
//! [`StoreConfig`]; nothing here knows any storefront by name.

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use farmaprice_core::records::ListingRecord;
use farmaprice_core::stores::{ApiConfig, StoreConfig};

use crate::error::ScrapeError;
use crate::extract::{extract_card, resolve_url, CardFields};
use crate::normalize::normalize_price;
use crate::transport::Transport;

/// One retailer bound to a transport.
pub struct StoreAdapter {
    config: StoreConfig,
    transport: Arc<dyn Transport>,
}

impl StoreAdapter {
    #[must_use]
    pub fn new(config: StoreConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.config.id
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Expand the store's URL template for `query`.
    #[must_use]
    pub fn search_url(&self, query: &str) -> String {
        let template = self
            .config
            .api
            .as_ref()
            .map_or(self.config.search_url.as_str(), |api| api.url.as_str());
        build_search_url(
            template,
            &self.config.base_url,
            query,
            self.config.first_token_path,
        )
    }

    /// Fetch the search document and extract up to `max_results` listings.
    ///
    /// An empty result is not an error: a page with zero matching cards
    /// comes back as `Ok(vec![])`. Missing fields within a card never fail
    /// the card.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Transport`] when the document cannot be
    /// fetched, and [`ScrapeError::Decode`] or
    /// [`ScrapeError::ItemsPathNotFound`] when a structured endpoint
    /// returns an unusable body.
    pub async fn fetch_listings(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<ListingRecord>, ScrapeError> {
        let url = self.search_url(query);
        tracing::debug!(store = %self.config.id, url = %url, "fetching search document");

        let body = self
            .transport
            .fetch_document(&url)
            .await
            .map_err(|source| ScrapeError::Transport {
                store: self.config.id.clone(),
                source,
            })?;

        if let Some(api) = &self.config.api {
            self.parse_api_listings(api, &body, max_results)
        } else {
            Ok(self.parse_html_listings(&body, max_results))
        }
    }

    /// Extract listings from an HTML document via the card-selector
    /// cascade. The first selector that matches at least one element
    /// defines the card set; `max_results` caps the cards iterated.
    fn parse_html_listings(&self, body: &str, max_results: usize) -> Vec<ListingRecord> {
        let document = Html::parse_document(body);
        let cards = select_cards(&document, &self.config.card_selectors);
        if cards.is_empty() {
            tracing::debug!(store = %self.config.id, "no cards matched any selector");
            return Vec::new();
        }

        cards
            .into_iter()
            .take(max_results)
            .map(|card| {
                self.record_from_fields(extract_card(card, &self.config.fields, &self.config.base_url))
            })
            .collect()
    }

    fn record_from_fields(&self, fields: CardFields) -> ListingRecord {
        let price = normalize_price(fields.price_raw.as_deref());
        ListingRecord {
            store: self.config.id.clone(),
            title: fields.title,
            price_raw: fields.price_raw,
            price,
            link: fields.link,
            img: fields.img,
        }
    }

    /// Extract listings from a structured JSON payload.
    fn parse_api_listings(
        &self,
        api: &ApiConfig,
        body: &str,
        max_results: usize,
    ) -> Result<Vec<ListingRecord>, ScrapeError> {
        let document: Value =
            serde_json::from_str(body).map_err(|source| ScrapeError::Decode {
                store: self.config.id.clone(),
                source,
            })?;

        let items = lookup_path(&document, &api.items_path)
            .and_then(Value::as_array)
            .ok_or_else(|| ScrapeError::ItemsPathNotFound {
                store: self.config.id.clone(),
                items_path: api.items_path.clone(),
            })?;

        let mut records = Vec::new();
        for item in items.iter().take(max_results) {
            if !item.is_object() {
                tracing::debug!(store = %self.config.id, "skipping non-object result item");
                continue;
            }
            records.push(self.record_from_item(api, item));
        }
        Ok(records)
    }

    fn record_from_item(&self, api: &ApiConfig, item: &Value) -> ListingRecord {
        let title = first_string_at(item, &api.fields.title);
        let link = first_string_at(item, &api.fields.link)
            .map(|v| resolve_url(&self.config.base_url, &v));
        let img = first_string_at(item, &api.fields.image)
            .map(|v| resolve_url(&self.config.base_url, &v));
        let (price_raw, price) = first_price_at(item, &api.fields.price);
        ListingRecord {
            store: self.config.id.clone(),
            title,
            price_raw,
            price,
            link,
            img,
        }
    }
}

/// Run the card-selector cascade: selectors are tried in order and the
/// first one that matches anything wins outright, even if a later selector
/// would have matched more.
fn select_cards<'a>(document: &'a Html, selectors: &[String]) -> Vec<ElementRef<'a>> {
    for raw in selectors {
        let Ok(selector) = Selector::parse(raw) else {
            tracing::debug!(selector = %raw, "skipping unparseable card selector");
            continue;
        };
        let cards: Vec<ElementRef<'a>> = document.select(&selector).collect();
        if !cards.is_empty() {
            return cards;
        }
    }
    Vec::new()
}

/// Expand a search URL template.
///
/// `{base}` becomes the store's base URL without its trailing slash,
/// `{query}` the full percent-encoded query, and `{token}` (only filled
/// for `first_token_path` stores) the encoded first whitespace-delimited
/// word. Some storefronts route the first word as a path segment and only
/// take the rest as a query parameter.
pub(crate) fn build_search_url(
    template: &str,
    base_url: &str,
    query: &str,
    first_token_path: bool,
) -> String {
    let query = query.trim();
    let mut url = template.replace("{base}", base_url.trim_end_matches('/'));
    if first_token_path {
        let token = query.split_whitespace().next().unwrap_or_default();
        url = url.replace("{token}", &encode_component(token));
    }
    url.replace("{query}", &encode_component(query))
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Walk a dot-separated path (`"results.products"`) into a JSON value.
fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = current.get(segment)?;
    }
    Some(current)
}

fn first_string_at(item: &Value, paths: &[String]) -> Option<String> {
    paths.iter().find_map(|path| {
        lookup_path(item, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    })
}

/// Pull a price out of a JSON item. String values go through the same
/// normalization as markup text; numeric values are taken as-is, since the
/// thousands-separator heuristic only applies to locale-formatted text.
fn first_price_at(item: &Value, paths: &[String]) -> (Option<String>, Option<f64>) {
    for path in paths {
        match lookup_path(item, path) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                let raw = s.trim().to_owned();
                let price = normalize_price(Some(&raw));
                return (Some(raw), price);
            }
            Some(Value::Number(n)) => {
                return (Some(n.to_string()), n.as_f64());
            }
            _ => {}
        }
    }
    (None, None)
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
