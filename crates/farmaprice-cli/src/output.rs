//! Terminal rendering for search results.

use std::cmp::Ordering;
use std::time::Duration;

use farmaprice_core::records::{best_priced, AggregateResult, ListingRecord};

/// Print the full comparison: every listing sorted by price, then the best
/// price per store, then a one-line summary.
pub(crate) fn print_results(results: &AggregateResult, elapsed: Duration) {
    let rows = sorted_rows(results);

    if rows.is_empty() {
        println!("no listings found; try another query or check the store registry");
    } else {
        println!();
        print_row("store", "title", "price raw", "price", "link");
        for record in &rows {
            print_row(
                &record.store,
                record.title.as_deref().unwrap_or("-"),
                record.price_raw.as_deref().unwrap_or("-"),
                &format_price(record.price),
                record.link.as_deref().unwrap_or("-"),
            );
        }

        println!();
        println!("best price per store:");
        for (store, records) in results {
            match best_priced(records) {
                Some(best) => println!(
                    "  {:<12} {:>12}  {}",
                    store,
                    format_price(best.price),
                    truncate(best.title.as_deref().unwrap_or("-"), 60),
                ),
                None => println!("  {:<12} {:>12}", store, "-"),
            }
        }
    }

    let total: usize = results.values().map(Vec::len).sum();
    println!();
    println!(
        "{total} listings from {} stores in {:.1}s",
        results.len(),
        elapsed.as_secs_f64(),
    );
}

fn print_row(store: &str, title: &str, price_raw: &str, price: &str, link: &str) {
    println!(
        "{:<12} {:<44} {:>12} {:>12}  {}",
        truncate(store, 12),
        truncate(title, 44),
        truncate(price_raw, 12),
        price,
        link,
    );
}

/// Flatten the per-store map into one list sorted by price ascending.
/// Listings without a price go last so the cheapest offers lead.
pub(crate) fn sorted_rows(results: &AggregateResult) -> Vec<&ListingRecord> {
    let mut rows: Vec<&ListingRecord> = results.values().flatten().collect();
    rows.sort_by(|a, b| compare_prices(a.price, b.price));
    rows
}

fn compare_prices(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Render a price for display. Colombian peso amounts are integral almost
/// everywhere, so whole values drop the decimals.
pub(crate) fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) if p.fract().abs() < f64::EPSILON => format!("${p:.0}"),
        Some(p) => format!("${p:.2}"),
        None => "-".to_string(),
    }
}

/// Cap a cell at `max_chars`, marking the cut with an ellipsis.
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
