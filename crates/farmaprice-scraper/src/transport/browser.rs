//! Headless-browser transport backed by chromiumoxide.
//!
//! Several of the storefronts are single-page apps that ship an empty
//! shell over plain HTTP and only materialize product cards after their
//! scripts run. For those, the document has to come from a rendered DOM.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;

use super::Transport;
use crate::error::TransportError;

/// Chrome flags for running inside containers without a GPU or a usable
/// /dev/shm.
const LAUNCH_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
];

/// One headless Chrome shared across a search; each fetch gets its own tab.
pub struct BrowserTransport {
    browser: Browser,
    user_agent: String,
    navigation_timeout: Duration,
    render_wait: Duration,
}

impl BrowserTransport {
    /// Launch a headless Chrome and start draining its CDP event stream.
    ///
    /// `render_wait_ms` is how long a page is given after navigation for
    /// its scripts to populate the DOM.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::BrowserLaunch`] when Chrome cannot be
    /// configured or started.
    pub async fn launch(
        user_agent: &str,
        timeout_secs: u64,
        render_wait_ms: u64,
    ) -> Result<Self, TransportError> {
        let mut builder = BrowserConfig::builder();
        for arg in LAUNCH_ARGS {
            builder = builder.arg(arg);
        }
        let config = builder.build().map_err(TransportError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| TransportError::BrowserLaunch(e.to_string()))?;

        // The handler must be polled for the browser connection to make
        // progress; it ends when the browser goes away.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            user_agent: user_agent.to_owned(),
            navigation_timeout: Duration::from_secs(timeout_secs),
            render_wait: Duration::from_millis(render_wait_ms),
        })
    }

    async fn fetch_on_page(&self, page: &Page, url: &str) -> Result<String, TransportError> {
        page.execute(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(|e| fetch_error(url, e))?;

        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| fetch_error(url, e))?;
        tokio::time::timeout(self.navigation_timeout, page.execute(params))
            .await
            .map_err(|_| fetch_error(url, "navigation timed out"))?
            .map_err(|e| fetch_error(url, e))?;

        // Give client-side rendering time to fill in the cards.
        tokio::time::sleep(self.render_wait).await;

        let content = page
            .content()
            .await
            .map_err(|e| fetch_error(url, e))?;
        if content.trim().is_empty() {
            return Err(TransportError::EmptyBody {
                url: url.to_owned(),
            });
        }
        Ok(content)
    }
}

fn fetch_error(url: &str, reason: impl ToString) -> TransportError {
    TransportError::BrowserFetch {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl Transport for BrowserTransport {
    async fn fetch_document(&self, url: &str) -> Result<String, TransportError> {
        // A fresh tab per fetch keeps concurrent stores from clobbering
        // each other's navigation.
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| fetch_error(url, e))?;

        let result = self.fetch_on_page(&page, url).await;
        let _ = page.close().await;
        result
    }
}
