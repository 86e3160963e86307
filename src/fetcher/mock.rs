use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{Result, TributaryError};
use crate::fetcher::Fetcher;

/// In-memory fetcher whose responses can be swapped between calls.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, std::result::Result<String, String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.into()));
    }

    pub fn fail(&self, url: &str, reason: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(reason.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        let response = self.responses.lock().unwrap().get(url).cloned();
        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(reason)) => Err(TributaryError::Network(reason)),
            None => Err(TributaryError::Network(format!("no route to {url}"))),
        }
    }
}

/// A minimal RSS 2.0 document with one item per `(guid, title)` pair.
/// Each item links to `https://example.com/posts/<guid>`.
pub fn rss(title: &str, items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(guid, item_title)| {
            format!(
                "<item><title>{item_title}</title><link>https://example.com/posts/{guid}</link>\
                 <guid>{guid}</guid><description>About {item_title}</description></item>"
            )
        })
        .collect();
    channel(title, &items)
}

/// Like [`rss`] but without `<guid>` elements, so items are keyed by link
/// alone. Pairs are `(slug, title)`; each item links to
/// `https://example.com/posts/<slug>`.
pub fn rss_without_guids(title: &str, items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(slug, item_title)| {
            format!(
                "<item><title>{item_title}</title><link>https://example.com/posts/{slug}</link>\
                 <description>About {item_title}</description></item>"
            )
        })
        .collect();
    channel(title, &items)
}

fn channel(title: &str, items: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>{title}</title><description>{title} description</description>
<link>https://example.com</link>{items}</channel></rss>"#
    )
}
