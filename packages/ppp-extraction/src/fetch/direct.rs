//! Direct-mode fetching: a single HTTP GET with a realistic user-agent.
//!
//! Fast path for static pages. JS-rendered and bot-gated sources need
//! [`RenderedFetcher`](crate::fetch::rendered::RenderedFetcher) instead.

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::fetch::text::visible_text;
use crate::types::config::FetchConfig;
use crate::types::page::FetchResult;

/// Plain HTTP fetcher.
pub struct DirectFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl DirectFetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { client, config }
    }

    /// Fetch a URL and extract its visible text.
    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        debug!(url = %url, "direct fetch starting");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "direct fetch failed");
                self.classify(url, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| self.classify(url, e))?;
        let text = visible_text(&html);

        debug!(
            url = %url,
            final_url = %final_url,
            html_len = html.len(),
            text_len = text.len(),
            "direct fetch complete"
        );

        Ok(FetchResult {
            html: Some(html),
            text,
            final_url,
        })
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                elapsed: self.config.request_timeout,
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: Box::new(error),
            }
        }
    }
}
