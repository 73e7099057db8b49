//! Price text normalization for Colombian-formatted amounts.
//!
//! Storefronts render prices as `$ 3.499`, `$3.499,00`, or occasionally a
//! bare `28900`. In this locale the period is a thousands separator and the
//! comma, when present, is the decimal separator. `3.499` is three thousand
//! four hundred ninety-nine pesos, not a float.

/// Strip a price string down to digits, commas, and periods.
///
/// Currency symbols, whitespace, and letters all go.
#[must_use]
pub fn clean_price_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect()
}

/// Normalize locale-formatted price text to a numeric value.
///
/// Exactly one comma alongside at least one period marks the comma as the
/// decimal separator: periods are dropped and the comma becomes a `.`.
/// In every other shape the periods are thousands separators and are
/// removed outright. Returns `None` for absent, blank, or unparseable
/// input; a bad price never fails a scrape.
#[must_use]
pub fn normalize_price(text: Option<&str>) -> Option<f64> {
    let text = text?;
    if text.trim().is_empty() {
        return None;
    }

    let cleaned = clean_price_text(text);
    let commas = cleaned.matches(',').count();
    let periods = cleaned.matches('.').count();

    let plain = if commas == 1 && periods >= 1 {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.replace('.', "")
    };

    plain.parse::<f64>().ok()
}
