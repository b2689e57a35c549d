//! HTTP access for the cloud adapter
//!
//! Every upstream call goes through [`HttpFetcher`], so the adapter can be driven by
//! a scripted fetcher in tests and by [`ReqwestFetcher`] in production.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::HttpConfig;
use crate::{Error, Result};

/// A GET request: URL, query pairs and extra headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Source of upstream response bodies
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Perform the request and return the body of a 2xx response
    async fn get_text(&self, request: &FetchRequest) -> Result<String>;
}

/// reqwest-backed fetcher with a fixed timeout and a politeness delay before each call
pub struct ReqwestFetcher {
    client: Client,
    request_delay: Duration,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    #[instrument(skip(self, request), fields(url = %request.url))]
    async fn get_text(&self, request: &FetchRequest) -> Result<String> {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(
                request.url.clone(),
                format!("HTTP {}", status),
            ));
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched upstream response");
        Ok(body)
    }
}
