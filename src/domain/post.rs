use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned post identifier. Feed-provided guids are not trusted for
/// identity, so every post gets one of these on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(u64);

impl PostId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PostId)
    }
}

/// Identity of an item within one feed: guid when the feed provides one,
/// otherwise the item link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey<'a> {
    Guid(&'a str),
    Link(&'a str),
}

impl DedupKey<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            DedupKey::Guid(s) | DedupKey::Link(s) => s,
        }
    }
}

impl fmt::Display for DedupKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn dedup_key<'a>(guid: &'a Option<String>, link: &'a str) -> DedupKey<'a> {
    match guid.as_deref() {
        Some(guid) if !guid.is_empty() => DedupKey::Guid(guid),
        _ => DedupKey::Link(link),
    }
}

/// One item as it came out of the parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedItem {
    pub guid: Option<String>,
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Every child element of the item, keyed by local element name.
    pub fields: BTreeMap<String, String>,
}

impl ParsedItem {
    pub fn dedup_key(&self) -> DedupKey<'_> {
        dedup_key(&self.guid, &self.link)
    }
}

/// An item selected for insertion, tagged with the feed it came from.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub feed_link: String,
    pub item: ParsedItem,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub feed_link: String,
    pub guid: Option<String>,
    pub title: String,
    pub description: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub fields: BTreeMap<String, String>,
}

impl Post {
    pub fn from_new(id: PostId, new_post: NewPost) -> Self {
        let NewPost { feed_link, item } = new_post;
        Self {
            id,
            feed_link,
            guid: item.guid,
            title: item.title,
            description: item.description,
            link: item.link,
            published_at: item.published_at,
            fields: item.fields,
        }
    }

    pub fn dedup_key(&self) -> DedupKey<'_> {
        dedup_key(&self.guid, &self.link)
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(guid: Option<&str>, link: &str) -> ParsedItem {
        ParsedItem {
            guid: guid.map(String::from),
            title: "Title".into(),
            description: "Body".into(),
            link: link.into(),
            published_at: None,
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn test_dedup_key_prefers_guid() {
        let item = parsed(Some("guid-1"), "https://example.com/1");
        assert_eq!(item.dedup_key(), DedupKey::Guid("guid-1"));
    }

    #[test]
    fn test_dedup_key_falls_back_to_link() {
        let item = parsed(None, "https://example.com/1");
        assert_eq!(item.dedup_key(), DedupKey::Link("https://example.com/1"));

        let blank_guid = parsed(Some(""), "https://example.com/1");
        assert_eq!(blank_guid.dedup_key(), DedupKey::Link("https://example.com/1"));
    }

    #[test]
    fn test_post_keeps_source_fields() {
        let new_post = NewPost {
            feed_link: "https://example.com/rss".into(),
            item: parsed(Some("guid-1"), "https://example.com/1"),
        };
        let post = Post::from_new(PostId::new(7), new_post);

        assert_eq!(post.id, PostId::new(7));
        assert_eq!(post.guid.as_deref(), Some("guid-1"));
        assert_eq!(post.link, "https://example.com/1");
        assert_eq!(post.title, "Title");
        assert_eq!(post.feed_link, "https://example.com/rss");
    }

    #[test]
    fn test_post_id_parses_from_attribute_text() {
        assert_eq!(" 42 ".parse::<PostId>().unwrap(), PostId::new(42));
        assert!("abc".parse::<PostId>().is_err());
        assert_eq!(PostId::new(3).to_string(), "3");
    }
}
