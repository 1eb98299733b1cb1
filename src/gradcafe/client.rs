// src/gradcafe/client.rs
use crate::utils::config::ClientConfig;
use crate::utils::error::FetchError;
use reqwest::header;
use std::future::Future;
use std::time::Duration;

/// Anything that can hand back the HTML of a detail page.
///
/// Implementations report every failure as a `FetchError`; callers decide
/// whether that is fatal.
pub trait DetailFetcher {
    fn fetch_detail(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// reqwest-backed client for result detail pages.
pub struct GradCafeClient {
    client: reqwest::Client,
    request_delay: Duration,
}

impl GradCafeClient {
    /// Creates a client configured with the identifying User-Agent and timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        tracing::debug!("Using User-Agent: {}", config.user_agent);

        Ok(Self {
            client,
            request_delay: config.request_delay,
        })
    }

    /// Downloads a detail page. Single attempt, no retry.
    pub async fn download_detail_page(&self, url: &str) -> Result<String, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::EmptyUrl);
        }

        // --- Politeness delay ---
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        tracing::debug!("Downloading detail page: {}", url);

        let response = self.client.get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::debug!("HTTP status {} for URL: {}", status, url);
            if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                tracing::warn!("Received {} - check User-Agent and request delay.", status);
                return Err(FetchError::RateLimited);
            }
            return Err(FetchError::Http(status));
        }

        let body = response.text().await?;
        tracing::debug!("Downloaded {} bytes from {}", body.len(), url);

        Ok(body)
    }
}

impl DetailFetcher for GradCafeClient {
    fn fetch_detail(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send {
        self.download_detail_page(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_is_rejected_before_any_request() {
        let config = ClientConfig {
            request_delay: Duration::ZERO,
            ..ClientConfig::default()
        };
        let client = GradCafeClient::new(&config).unwrap();
        let result = tokio_test::block_on(client.download_detail_page("   "));
        assert!(matches!(result, Err(FetchError::EmptyUrl)));
    }
}
