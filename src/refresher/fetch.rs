use crate::core::settings::SourceSettings;
use crate::refresher::RefreshError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en;q=0.8";

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self) -> Result<String, RefreshError>;
}

/// Fetches the ticket page over HTTP with a browser-like header set, a
/// bounded timeout, and a small fixed number of retries.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    url: String,
    attempts: u32,
    backoff: Duration,
}

impl HttpPageFetcher {
    pub fn new(source: &SourceSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(source.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: source.url.clone(),
            attempts: source.retry_attempts.max(1),
            backoff: Duration::from_secs(source.retry_backoff_secs),
        })
    }

    async fn fetch_once(&self) -> Result<String, reqwest::Error> {
        let response = self
            .client
            .get(&self.url)
            .header("User-Agent", BROWSER_USER_AGENT)
            .header("Accept", BROWSER_ACCEPT)
            .header("Accept-Language", BROWSER_ACCEPT_LANGUAGE)
            .send()
            .await?
            .error_for_status()?;

        response.text().await
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self) -> Result<String, RefreshError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(html) => return Ok(html),
                Err(e) if attempt < self.attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.attempts,
                        error = %e,
                        "Ticket page fetch failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => return Err(RefreshError::Network(e)),
            }
        }
    }
}
