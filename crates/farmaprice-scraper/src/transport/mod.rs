//! Document transport: how raw search documents are obtained.
//!
//! Adapters only ever see the [`Transport`] trait. Whether the body came
//! from a plain GET or a rendered headless-browser DOM is invisible to
//! them, which is what lets one adapter pipeline serve both storefront
//! kinds.

use async_trait::async_trait;

use crate::error::TransportError;

mod http;
pub use http::HttpTransport;

#[cfg(feature = "browser")]
mod browser;
#[cfg(feature = "browser")]
pub use browser::BrowserTransport;

/// Fetches one document by URL.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the document at `url` and return its text body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the document cannot be obtained:
    /// connection trouble, a non-success status, an empty body, or a
    /// browser-side failure.
    async fn fetch_document(&self, url: &str) -> Result<String, TransportError>;
}
