//! Read-through proxy fetching.
//!
//! Feeds are requested as `GET <base>/get?url=<target>&disableCache=true`.
//! The proxy answers with a JSON envelope whose `contents` is the upstream
//! body and whose `status.http_code` is the upstream status.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::app::{Result, TributaryError};
use crate::config::{FetchConfig, ProxyConfig};
use crate::fetcher::{build_client, Fetcher};

#[derive(Debug, Deserialize)]
struct Envelope {
    contents: Option<String>,
    status: Option<EnvelopeStatus>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeStatus {
    http_code: Option<u16>,
}

pub struct ProxyFetcher {
    client: Client,
    base: Url,
    disable_cache: bool,
}

impl ProxyFetcher {
    pub fn new(proxy: &ProxyConfig, fetch: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(fetch)?,
            base: Url::parse(&proxy.base_url)?,
            disable_cache: proxy.disable_cache,
        })
    }

    /// The proxy URL that re-serves `target`.
    pub fn proxied_url(&self, target: &str) -> Result<Url> {
        let mut url = self.base.join("/get")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("url", target);
            if self.disable_cache {
                query.append_pair("disableCache", "true");
            }
        }
        Ok(url)
    }
}

/// Pull the upstream body out of a proxy response.
pub fn decode_envelope(body: &[u8]) -> Result<String> {
    let envelope: Envelope = serde_json::from_slice(body)?;

    if let Some(code) = envelope.status.and_then(|s| s.http_code) {
        if code != 200 {
            return Err(TributaryError::Network(format!(
                "upstream responded with HTTP {code}"
            )));
        }
    }

    envelope
        .contents
        .ok_or_else(|| TributaryError::Network("proxy response has no contents".into()))
}

#[async_trait]
impl Fetcher for ProxyFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let proxied = self.proxied_url(url)?;
        let response = self.client.get(proxied).send().await?;
        response.error_for_status_ref()?;

        let body = response.bytes().await?;
        let contents = decode_envelope(&body)?;
        tracing::debug!(url, bytes = contents.len(), "Fetched feed through proxy");
        Ok(contents)
    }
}
