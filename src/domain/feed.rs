use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::ParsedItem;

/// A subscribed feed. `link` is the URL the user submitted and is unique
/// across the application state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub link: String,
    /// Key of the newest item seen on the last successful fetch.
    pub newest_marker: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl Feed {
    pub fn new(link: String, title: String, description: String) -> Self {
        Self {
            title,
            description,
            link,
            newest_marker: None,
            added_at: Utc::now(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.link
        } else {
            &self.title
        }
    }
}

/// Output of the feed parser: channel metadata plus its items, before any
/// of it has been merged into application state.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedFeed {
    pub title: String,
    pub description: String,
    pub link: String,
    pub items: Vec<ParsedItem>,
}

impl ParsedFeed {
    /// Split into the stored feed record and its raw items.
    pub fn into_parts(self) -> (Feed, Vec<ParsedItem>) {
        let mut feed = Feed::new(self.link, self.title, self.description);
        feed.newest_marker = self.items.first().map(|item| item.dedup_key().to_string());
        (feed, self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(guid: Option<&str>, link: &str) -> ParsedItem {
        ParsedItem {
            guid: guid.map(String::from),
            title: "t".into(),
            description: String::new(),
            link: link.into(),
            published_at: None,
            fields: Default::default(),
        }
    }

    #[test]
    fn test_display_title_falls_back_to_link() {
        let feed = Feed::new("https://example.com/rss".into(), String::new(), String::new());
        assert_eq!(feed.display_title(), "https://example.com/rss");
    }

    #[test]
    fn test_into_parts_sets_marker_from_first_item() {
        let parsed = ParsedFeed {
            title: "Example".into(),
            description: "desc".into(),
            link: "https://example.com/rss".into(),
            items: vec![item(Some("g-2"), "https://example.com/2"), item(None, "https://example.com/1")],
        };

        let (feed, items) = parsed.into_parts();
        assert_eq!(feed.newest_marker.as_deref(), Some("g-2"));
        assert_eq!(feed.title, "Example");
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_into_parts_without_items() {
        let parsed = ParsedFeed {
            title: "Empty".into(),
            description: String::new(),
            link: "https://example.com/rss".into(),
            items: Vec::new(),
        };

        let (feed, items) = parsed.into_parts();
        assert!(feed.newest_marker.is_none());
        assert!(items.is_empty());
    }
}
