//! Declarative store registry.
//!
//! Every retailer is described entirely by configuration: URL template, card
//! boundary selectors, and ordered per-field lookup candidates. The scraping
//! pipeline itself is store-agnostic; adding a retailer means adding a YAML
//! entry, not code.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One prioritized lookup candidate for a card field: a CSS selector plus an
/// optional attribute to read. Text content is used when `attr` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCandidate {
    pub selector: String,
    #[serde(default)]
    pub attr: Option<String>,
}

/// Ordered fallback candidates for each extracted field. The first candidate
/// that matches an element and yields a non-empty value wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    pub title: Vec<FieldCandidate>,
    pub price: Vec<FieldCandidate>,
    pub link: Vec<FieldCandidate>,
    pub image: Vec<FieldCandidate>,
}

/// Ordered fallback dot-paths per field for structured endpoints, relative
/// to one result item (e.g. `"price.formatted"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiFieldPaths {
    pub title: Vec<String>,
    pub price: Vec<String>,
    pub link: Vec<String>,
    pub image: Vec<String>,
}

/// Structured (JSON) search endpoint for stores that expose an API instead
/// of server-rendered markup. When present, card and field selectors are
/// unused for that store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint template; `{query}` is replaced with the encoded query.
    pub url: String,
    /// Dot-path to the array of result items, e.g. `"results.products"`.
    /// An empty segment list addresses the document root.
    pub items_path: String,
    #[serde(default)]
    pub fields: ApiFieldPaths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Stable registry identifier; also the key in the aggregate mapping.
    pub id: String,
    /// Human-readable store name for display.
    pub name: String,
    pub base_url: String,
    /// Search URL template. Supports `{base}`, `{query}` and, when
    /// `first_token_path` is set, `{token}`.
    pub search_url: String,
    /// When true, `{token}` receives the first whitespace-delimited token of
    /// the query as a path segment while `{query}` still receives the full
    /// query. Some storefronts route search this way.
    #[serde(default)]
    pub first_token_path: bool,
    /// Card-boundary selectors, tried in order; the first that matches at
    /// least one element wins.
    #[serde(default)]
    pub card_selectors: Vec<String>,
    #[serde(default)]
    pub fields: FieldRules,
    #[serde(default)]
    pub api: Option<ApiConfig>,
}

impl StoreConfig {
    /// Returns `true` when this store is scraped through its structured
    /// JSON endpoint rather than HTML cards.
    #[must_use]
    pub fn uses_structured_api(&self) -> bool {
        self.api.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
}

/// Load and validate the store registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    if stores_file.stores.is_empty() {
        return Err(ConfigError::Validation(
            "stores file must declare at least one store".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();

    for store in &stores_file.stores {
        if store.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store id must be non-empty".to_string(),
            ));
        }
        if store.id.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "store id '{}' must not contain whitespace",
                store.id
            )));
        }
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "store '{}' must have a non-empty name",
                store.id
            )));
        }

        if !seen_ids.insert(store.id.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store id: '{}'",
                store.id
            )));
        }

        if !store.base_url.starts_with("http://") && !store.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "store '{}' base_url must start with http:// or https://",
                store.id
            )));
        }

        if let Some(api) = &store.api {
            if !api.url.contains("{query}") {
                return Err(ConfigError::Validation(format!(
                    "store '{}' api url must contain a {{query}} placeholder",
                    store.id
                )));
            }
            if api.items_path.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "store '{}' api items_path must be non-empty",
                    store.id
                )));
            }
        } else {
            if !store.search_url.contains("{query}") {
                return Err(ConfigError::Validation(format!(
                    "store '{}' search_url must contain a {{query}} placeholder",
                    store.id
                )));
            }
            if store.first_token_path && !store.search_url.contains("{token}") {
                return Err(ConfigError::Validation(format!(
                    "store '{}' sets first_token_path but search_url has no {{token}} placeholder",
                    store.id
                )));
            }
            if store.card_selectors.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "store '{}' must declare at least one card selector",
                    store.id
                )));
            }
        }
    }

    Ok(())
}
