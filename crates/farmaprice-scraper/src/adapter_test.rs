use super::*;

use async_trait::async_trait;
use serde_json::json;

use farmaprice_core::stores::{ApiFieldPaths, FieldCandidate, FieldRules};

use crate::error::TransportError;

// -----------------------------------------------------------------------
// fixtures
// -----------------------------------------------------------------------

fn candidate(selector: &str, attr: Option<&str>) -> FieldCandidate {
    FieldCandidate {
        selector: selector.to_string(),
        attr: attr.map(str::to_owned),
    }
}

fn html_store() -> StoreConfig {
    StoreConfig {
        id: "droguerias-test".to_string(),
        name: "Droguerías Test".to_string(),
        base_url: "https://shop.example".to_string(),
        search_url: "{base}/buscar?product={query}".to_string(),
        first_token_path: false,
        card_selectors: vec![
            "div.product-card".to_string(),
            "div[class*=\"card\"]".to_string(),
        ],
        fields: FieldRules {
            title: vec![candidate("h3.name", None), candidate("h3", None)],
            price: vec![candidate("span.price", None)],
            link: vec![candidate("a", Some("href"))],
            image: vec![
                candidate("img", Some("src")),
                candidate("img", Some("data-src")),
            ],
        },
        api: None,
    }
}

fn api_store() -> StoreConfig {
    StoreConfig {
        id: "api-test".to_string(),
        name: "API Test".to_string(),
        base_url: "https://api.example".to_string(),
        search_url: String::new(),
        first_token_path: false,
        card_selectors: Vec::new(),
        fields: FieldRules::default(),
        api: Some(ApiConfig {
            url: "{base}/search?q={query}".to_string(),
            items_path: "results.products".to_string(),
            fields: ApiFieldPaths {
                title: vec!["name".to_string()],
                price: vec!["price.amount".to_string(), "price_text".to_string()],
                link: vec!["url".to_string()],
                image: vec!["image".to_string()],
            },
        }),
    }
}

struct FixedTransport(String);

#[async_trait]
impl Transport for FixedTransport {
    async fn fetch_document(&self, _url: &str) -> Result<String, TransportError> {
        Ok(self.0.clone())
    }
}

struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    async fn fetch_document(&self, url: &str) -> Result<String, TransportError> {
        Err(TransportError::UnexpectedStatus {
            status: 503,
            url: url.to_owned(),
        })
    }
}

fn adapter_with_body(config: StoreConfig, body: &str) -> StoreAdapter {
    StoreAdapter::new(config, Arc::new(FixedTransport(body.to_string())))
}

// -----------------------------------------------------------------------
// search URL templates
// -----------------------------------------------------------------------

#[test]
fn full_query_template_encodes_the_whole_query() {
    let adapter = adapter_with_body(html_store(), "");
    assert_eq!(
        adapter.search_url("  dolex forte  "),
        "https://shop.example/buscar?product=dolex%20forte",
    );
}

#[test]
fn first_token_template_routes_one_word_into_the_path() {
    let mut config = html_store();
    config.search_url = "{base}/{token}?_q={query}&map=ft".to_string();
    config.first_token_path = true;
    let adapter = adapter_with_body(config, "");

    assert_eq!(
        adapter.search_url("dolex forte"),
        "https://shop.example/dolex?_q=dolex%20forte&map=ft",
    );
}

#[test]
fn base_placeholder_loses_its_trailing_slash() {
    assert_eq!(
        build_search_url("{base}/s?q={query}", "https://shop.example/", "dolex", false),
        "https://shop.example/s?q=dolex",
    );
}

#[test]
fn api_stores_use_the_api_template() {
    let adapter = adapter_with_body(api_store(), "");
    assert_eq!(
        adapter.search_url("ibuprofeno"),
        "https://api.example/search?q=ibuprofeno",
    );
}

// -----------------------------------------------------------------------
// HTML pipeline
// -----------------------------------------------------------------------

#[tokio::test]
async fn extracts_records_from_matching_cards() {
    let body = r#"
        <div class="product-card">
            <h3 class="name">Dolex 500mg x 24</h3>
            <span class="price">$ 9.800</span>
            <a href="/dolex-500/p">ver</a>
            <img src="/img/dolex.png">
        </div>
        <div class="product-card">
            <h3 class="name">Dolex Forte</h3>
            <span class="price">$ 12.350</span>
            <a href="https://cdn.example/dolex-forte">ver</a>
            <img data-src="//cdn.example/forte.png" src="">
        </div>
    "#;
    let adapter = adapter_with_body(html_store(), body);

    let records = adapter.fetch_listings("dolex", 6).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].store, "droguerias-test");
    assert_eq!(records[0].title.as_deref(), Some("Dolex 500mg x 24"));
    assert_eq!(records[0].price_raw.as_deref(), Some("$ 9.800"));
    assert_eq!(records[0].price, Some(9800.0));
    assert_eq!(records[0].link.as_deref(), Some("https://shop.example/dolex-500/p"));
    assert_eq!(records[0].img.as_deref(), Some("https://shop.example/img/dolex.png"));

    assert_eq!(records[1].price, Some(12_350.0));
    assert_eq!(records[1].link.as_deref(), Some("https://cdn.example/dolex-forte"));
    assert_eq!(records[1].img.as_deref(), Some("//cdn.example/forte.png"));
}

#[tokio::test]
async fn caps_at_max_results_cards() {
    let body = r#"
        <div class="product-card"><h3>Uno</h3></div>
        <div class="product-card"><h3>Dos</h3></div>
        <div class="product-card"><h3>Tres</h3></div>
    "#;
    let adapter = adapter_with_body(html_store(), body);

    let records = adapter.fetch_listings("x", 2).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].title.as_deref(), Some("Dos"));
}

#[tokio::test]
async fn falls_back_to_the_next_card_selector() {
    // No div.product-card anywhere, so the broad fallback has to find it.
    let body = r#"<div class="listing-card-wide"><h3>Fallback hit</h3></div>"#;
    let adapter = adapter_with_body(html_store(), body);

    let records = adapter.fetch_listings("x", 6).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title.as_deref(), Some("Fallback hit"));
}

#[tokio::test]
async fn zero_cards_is_an_empty_ok() {
    let adapter = adapter_with_body(html_store(), "<html><body><p>nada</p></body></html>");
    let records = adapter.fetch_listings("x", 6).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn card_with_nothing_extractable_still_yields_a_record() {
    let body = r#"<div class="product-card"><p>estructura rara</p></div>"#;
    let adapter = adapter_with_body(html_store(), body);

    let records = adapter.fetch_listings("x", 6).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, None);
    assert_eq!(records[0].price_raw, None);
    assert_eq!(records[0].price, None);
    assert_eq!(records[0].link, None);
    assert_eq!(records[0].img, None);
}

#[tokio::test]
async fn transport_failure_surfaces_as_a_typed_error() {
    let adapter = StoreAdapter::new(html_store(), Arc::new(FailingTransport));

    let err = adapter.fetch_listings("x", 6).await.unwrap_err();
    match err {
        ScrapeError::Transport { store, source } => {
            assert_eq!(store, "droguerias-test");
            assert!(matches!(
                source,
                TransportError::UnexpectedStatus { status: 503, .. }
            ));
        }
        other => panic!("expected transport error, got {other:?}"),
    }
}

// -----------------------------------------------------------------------
// structured JSON pipeline
// -----------------------------------------------------------------------

#[tokio::test]
async fn api_items_yield_records_with_both_price_shapes() {
    let body = json!({
        "results": {
            "products": [
                {
                    "name": "Ibuprofeno 400mg",
                    "price": { "amount": 8900 },
                    "url": "/ibuprofeno/p",
                    "image": "https://cdn.example/ibu.png"
                },
                {
                    "name": "Ibuprofeno MAX",
                    "price_text": "$ 15.200",
                    "url": "https://api.example/max"
                }
            ]
        }
    })
    .to_string();
    let adapter = adapter_with_body(api_store(), &body);

    let records = adapter.fetch_listings("ibuprofeno", 6).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title.as_deref(), Some("Ibuprofeno 400mg"));
    assert_eq!(records[0].price_raw.as_deref(), Some("8900"));
    assert_eq!(records[0].price, Some(8900.0));
    assert_eq!(records[0].link.as_deref(), Some("https://api.example/ibuprofeno/p"));

    assert_eq!(records[1].price_raw.as_deref(), Some("$ 15.200"));
    assert_eq!(records[1].price, Some(15_200.0));
    assert_eq!(records[1].img, None);
}

#[tokio::test]
async fn api_non_object_items_are_skipped_but_count_toward_the_cap() {
    let body = json!({
        "results": { "products": [ { "name": "A" }, 42, { "name": "B" } ] }
    })
    .to_string();

    let adapter = adapter_with_body(api_store(), &body);
    let records = adapter.fetch_listings("x", 3).await.unwrap();
    assert_eq!(records.len(), 2);

    let adapter = adapter_with_body(api_store(), &body);
    let records = adapter.fetch_listings("x", 2).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title.as_deref(), Some("A"));
}

#[tokio::test]
async fn api_missing_items_path_is_a_typed_error() {
    let body = json!({ "results": { "items": [] } }).to_string();
    let adapter = adapter_with_body(api_store(), &body);

    let err = adapter.fetch_listings("x", 6).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::ItemsPathNotFound { ref items_path, .. } if items_path == "results.products"
    ));
}

#[tokio::test]
async fn api_invalid_json_is_a_decode_error() {
    let adapter = adapter_with_body(api_store(), "<html>not json</html>");

    let err = adapter.fetch_listings("x", 6).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Decode { .. }));
}

// -----------------------------------------------------------------------
// JSON path lookup
// -----------------------------------------------------------------------

#[test]
fn lookup_path_walks_nested_objects() {
    let value = json!({ "a": { "b": { "c": 1 } } });
    assert_eq!(lookup_path(&value, "a.b.c"), Some(&json!(1)));
    assert_eq!(lookup_path(&value, "a.missing"), None);
    assert_eq!(lookup_path(&value, ""), Some(&value));
}
