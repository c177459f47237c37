use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::domain::FetchedPage;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Anything that can produce the course page once per poll cycle.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait PageSource: Send + Sync {
    async fn fetch(&self) -> Result<FetchedPage, FetchError>;
}

pub fn build_client() -> Result<Client> {
    let client = Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .build()?;
    Ok(client)
}

pub struct PageFetcher {
    client: Client,
    url: Url,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(client: Client, url: Url) -> Self {
        Self {
            client,
            url,
            timeout: FETCH_TIMEOUT,
        }
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn classify_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: self.url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Network {
                url: self.url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch(&self) -> Result<FetchedPage, FetchError> {
        tracing::debug!(target: "fetch", url = %self.url, "GET");
        let response = self
            .client
            .get(self.url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| self.classify_error(err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.classify_error(err))?;

        tracing::debug!(
            target: "fetch",
            url = %self.url,
            status = status.as_u16(),
            bytes = body.len(),
            "page fetched"
        );
        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }
}
