use thiserror::Error;

/// Failures raised while fetching a document, regardless of backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, timeout, or protocol-level failure from the HTTP client.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The server answered 2xx but the body was blank.
    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    /// Headless browser could not be started.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Headless browser failed while navigating or reading the page.
    #[error("browser fetch failed for {url}: {reason}")]
    BrowserFetch { url: String, reason: String },
}

/// Failures from one store's fetch-and-extract pipeline.
///
/// These never cross the aggregator boundary: the aggregator converts each
/// one into an empty result for that store and logs it.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The search document could not be fetched at all.
    #[error("transport failure for store {store}: {source}")]
    Transport {
        store: String,
        #[source]
        source: TransportError,
    },

    /// A structured endpoint returned a body that is not valid JSON.
    #[error("malformed JSON from store {store}: {source}")]
    Decode {
        store: String,
        #[source]
        source: serde_json::Error,
    },

    /// A structured endpoint decoded fine but held no array at the
    /// configured items path. Usually means the response shape changed.
    #[error("store {store}: no array at items path '{items_path}'")]
    ItemsPathNotFound { store: String, items_path: String },

    /// The store did not finish before the shared search deadline.
    #[error("store {store} exceeded the search deadline")]
    DeadlineExceeded { store: String },

    /// The store's task panicked. Isolated per store so one broken
    /// adapter cannot take the rest of a search down with it.
    #[error("store {store} task failed: {reason}")]
    TaskPanic { store: String, reason: String },
}
