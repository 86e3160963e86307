pub mod http_fetcher;
pub mod parallel;
pub mod proxy;

#[cfg(test)]
pub(crate) mod mock;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::app::{Result, TributaryError};
use crate::config::FetchConfig;

/// Retrieves the raw text of a feed.
///
/// Any error returned here is a transport-side failure. Whether the text is
/// a usable feed is decided later by the
/// [`Normalizer`](crate::normalizer::Normalizer).
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub(crate) fn build_client(config: &FetchConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .brotli(true)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| TributaryError::Network(format!("failed to build HTTP client: {e}")))
}
