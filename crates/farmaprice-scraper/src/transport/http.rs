//! Plain HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use reqwest::Client;

use super::Transport;
use crate::error::TransportError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP GET transport with a shared connection pool.
///
/// One instance serves every store in a search; `reqwest::Client` is
/// already reference-counted internally.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with the given per-request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_document(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "es-CO,es;q=0.9,en;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(TransportError::EmptyBody {
                url: url.to_owned(),
            });
        }
        Ok(body)
    }
}
