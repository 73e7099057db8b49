//! Command handlers: the search fan-out and the store listing.
//!
//! Per-store failures never abort a search; the aggregator already turns
//! them into empty entries. The handlers here only fail on user or
//! configuration errors the run cannot start without.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use farmaprice_core::{load_settings, load_stores, Settings};
use farmaprice_scraper::{Aggregator, HttpTransport, SearchOptions, Transport};

use crate::output;

pub(crate) struct SearchArgs {
    pub query: String,
    pub max: Option<usize>,
    pub stores: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub browser: bool,
}

/// Run one search across the configured stores and print the comparison.
///
/// # Errors
///
/// Returns an error if the query is blank, the settings or store registry
/// cannot be loaded, a requested store id is unknown, or the transport
/// cannot be built.
pub(crate) async fn run_search(args: SearchArgs) -> anyhow::Result<()> {
    let query = args.query.trim().to_owned();
    if query.is_empty() {
        anyhow::bail!("query must not be blank");
    }
    if args.max == Some(0) {
        anyhow::bail!("--max must be at least 1");
    }

    let settings = load_settings()?;
    let registry = load_stores(&settings.stores_path)?;

    let subset: Option<HashSet<String>> = match args.stores {
        Some(ids) => {
            let mut resolved = HashSet::new();
            for raw in &ids {
                let raw = raw.trim();
                let Some(store) = registry
                    .stores
                    .iter()
                    .find(|s| s.id.eq_ignore_ascii_case(raw))
                else {
                    let known: Vec<&str> =
                        registry.stores.iter().map(|s| s.id.as_str()).collect();
                    anyhow::bail!(
                        "unknown store id '{raw}'; configured ids: [{}]",
                        known.join(", ")
                    );
                };
                resolved.insert(store.id.clone());
            }
            Some(resolved)
        }
        None => None,
    };

    let store_count = subset
        .as_ref()
        .map_or(registry.stores.len(), HashSet::len);

    let mut options = SearchOptions::from_settings(&settings);
    if let Some(max) = args.max {
        options.max_per_store = max;
    }
    if let Some(secs) = args.timeout_secs {
        options.deadline = Duration::from_secs(secs);
    }
    options.store_subset = subset;

    let transport = build_transport(&settings, args.browser).await?;
    let aggregator = Aggregator::new(registry.stores, transport);

    tracing::info!(
        query = %query,
        stores = store_count,
        deadline_secs = options.deadline.as_secs(),
        max_per_store = options.max_per_store,
        "starting search"
    );
    println!("searching \"{query}\" across {store_count} stores");

    let started = Instant::now();
    let results = aggregator.search(&query, &options).await;
    output::print_results(&results, started.elapsed());

    Ok(())
}

/// Print the store registry, one line per store.
///
/// # Errors
///
/// Returns an error if the settings or store registry cannot be loaded.
pub(crate) fn list_stores() -> anyhow::Result<()> {
    let settings = load_settings()?;
    let registry = load_stores(&settings.stores_path)?;

    for store in &registry.stores {
        let kind = if store.uses_structured_api() {
            "api"
        } else {
            "html"
        };
        println!("{:<12} {:<28} {:<5} {}", store.id, store.name, kind, store.base_url);
    }
    Ok(())
}

async fn build_transport(
    settings: &Settings,
    browser: bool,
) -> anyhow::Result<Arc<dyn Transport>> {
    if browser {
        #[cfg(feature = "browser")]
        {
            let transport = farmaprice_scraper::BrowserTransport::launch(
                &settings.user_agent,
                settings.request_timeout_secs,
                settings.render_wait_ms,
            )
            .await?;
            return Ok(Arc::new(transport));
        }
        #[cfg(not(feature = "browser"))]
        {
            anyhow::bail!(
                "this binary was built without browser support; rebuild with --features browser"
            );
        }
    }

    let transport = HttpTransport::new(settings.request_timeout_secs, &settings.user_agent)?;
    Ok(Arc::new(transport))
}
