//! Concurrent fan-out across store adapters.
//!
//! One search hits every selected store at once, bounded by a shared
//! deadline. Stores are fully isolated from each other: a store that
//! errors, panics, or runs past the deadline contributes an empty entry
//! while the rest return whatever they found. The result map always
//! carries one key per selected store so callers can tell "queried and
//! found nothing" from "not queried".

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{timeout_at, Instant};

use farmaprice_core::records::{AggregateResult, ListingRecord};
use farmaprice_core::settings::Settings;
use farmaprice_core::stores::StoreConfig;

use crate::adapter::StoreAdapter;
use crate::error::ScrapeError;
use crate::transport::Transport;

/// Tuning for one [`Aggregator::search`] call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Cap on listings per store.
    pub max_per_store: usize,
    /// Restrict the search to these store ids. `None` means every
    /// configured store. Unknown ids are logged and ignored.
    pub store_subset: Option<HashSet<String>>,
    /// Wall-clock bound for the whole fan-out.
    pub deadline: Duration,
    /// How many stores fetch at the same time.
    pub max_concurrent: usize,
}

impl SearchOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_per_store: settings.max_per_store,
            store_subset: None,
            deadline: Duration::from_secs(settings.search_deadline_secs),
            max_concurrent: settings.max_concurrent_stores,
        }
    }
}

/// Owns one adapter per configured store and fans searches out across
/// them.
pub struct Aggregator {
    adapters: Vec<Arc<StoreAdapter>>,
}

impl Aggregator {
    /// Build adapters for every store config, all sharing `transport`.
    #[must_use]
    pub fn new(stores: Vec<StoreConfig>, transport: Arc<dyn Transport>) -> Self {
        let adapters = stores
            .into_iter()
            .map(|config| Arc::new(StoreAdapter::new(config, Arc::clone(&transport))))
            .collect();
        Self { adapters }
    }

    /// Ids of every configured store, in registry order.
    #[must_use]
    pub fn store_ids(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.id().to_string()).collect()
    }

    /// Run `query` against every selected store concurrently.
    ///
    /// Never fails as a whole: each store either delivers its listings or
    /// an empty entry, and every selected store id is present as a key in
    /// the returned map.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> AggregateResult {
        let selected: Vec<Arc<StoreAdapter>> = self
            .adapters
            .iter()
            .filter(|adapter| match &options.store_subset {
                Some(subset) => subset.contains(adapter.id()),
                None => true,
            })
            .cloned()
            .collect();

        if let Some(subset) = &options.store_subset {
            for id in subset {
                if !self.adapters.iter().any(|a| a.id() == id) {
                    tracing::warn!(store = %id, "requested store is not configured; ignoring");
                }
            }
        }

        // Seed every selected key up front so failures keep their slot.
        let mut results: AggregateResult = selected
            .iter()
            .map(|adapter| (adapter.id().to_string(), Vec::new()))
            .collect();

        let deadline = Instant::now() + options.deadline;
        let max_concurrent = options.max_concurrent.max(1);
        let max_per_store = options.max_per_store;
        let query: Arc<str> = Arc::from(query);

        let outcomes: Vec<(String, Result<Vec<ListingRecord>, ScrapeError>)> =
            stream::iter(selected)
                .map(|adapter| {
                    let query = Arc::clone(&query);
                    async move {
                        let id = adapter.id().to_string();
                        let outcome =
                            run_store(adapter, query, max_per_store, deadline, &id).await;
                        (id, outcome)
                    }
                })
                .buffer_unordered(max_concurrent)
                .collect()
                .await;

        let total = outcomes.len();
        let mut failed = 0usize;
        for (id, outcome) in outcomes {
            match outcome {
                Ok(records) => {
                    tracing::debug!(store = %id, count = records.len(), "store finished");
                    results.insert(id, records);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(store = %id, error = %e, "store failed; returning empty entry");
                }
            }
        }
        if failed > 0 {
            tracing::warn!(failed, total, "search finished with partial results");
        }
        results
    }
}

/// Run one store inside its own task so a panic cannot take down the
/// sibling stores, bounded by the shared deadline.
async fn run_store(
    adapter: Arc<StoreAdapter>,
    query: Arc<str>,
    max_per_store: usize,
    deadline: Instant,
    id: &str,
) -> Result<Vec<ListingRecord>, ScrapeError> {
    let mut handle =
        tokio::spawn(async move { adapter.fetch_listings(&query, max_per_store).await });

    match timeout_at(deadline, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ScrapeError::TaskPanic {
            store: id.to_owned(),
            reason: join_err.to_string(),
        }),
        Err(_) => {
            handle.abort();
            Err(ScrapeError::DeadlineExceeded {
                store: id.to_owned(),
            })
        }
    }
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
