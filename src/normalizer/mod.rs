use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Text};
use feed_rs::parser;
use html_escape::decode_html_entities;
use rss::extension::Extension;

use crate::app::{Result, TributaryError};
use crate::domain::{ParsedFeed, ParsedItem};

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse raw feed text fetched from `source_link`.
    ///
    /// RSS 2.0 documents are read element by element so every item child
    /// survives into [`ParsedItem::fields`]. Anything else `feed-rs`
    /// understands (Atom, RSS 1.0, JSON Feed) goes through it instead.
    ///
    /// The returned feed's `link` is always `source_link`, never whatever the
    /// channel advertises, so it stays equal to the subscribed URL.
    pub fn parse(&self, body: &str, source_link: &str) -> Result<ParsedFeed> {
        let (title, description, items) = match rss::Channel::read_from(body.as_bytes()) {
            Ok(channel) => from_channel(&channel)?,
            Err(rss_err) => {
                tracing::debug!(feed = source_link, error = %rss_err, "Not RSS 2.0, trying feed-rs");
                from_feed_rs(body)?
            }
        };

        let items = items
            .into_iter()
            .filter(|item| {
                if item.guid.is_none() && item.link.is_empty() {
                    tracing::debug!(feed = source_link, title = %item.title, "Skipping item without guid or link");
                    return false;
                }
                true
            })
            .collect();

        Ok(ParsedFeed {
            title,
            description,
            link: source_link.to_string(),
            items,
        })
    }
}

type Parts = (String, String, Vec<ParsedItem>);

fn from_channel(channel: &rss::Channel) -> Result<Parts> {
    let title = channel.title().trim();
    if title.is_empty() {
        return Err(TributaryError::FeedParse("channel has no <title>".into()));
    }
    let description = decode_html_entities(channel.description()).to_string();
    let items = channel.items().iter().map(normalize_item).collect();
    Ok((title.to_string(), description, items))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Flatten one `<item>` into a [`ParsedItem`]. Every child element lands in
/// `fields` under its local name; standard elements win over extension
/// elements that share a local name.
fn normalize_item(item: &rss::Item) -> ParsedItem {
    let mut fields = BTreeMap::new();
    let mut put = |name: &str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            fields.entry(name.to_string()).or_insert(value);
        }
    };

    let guid = non_empty(item.guid().map(|g| g.value()));
    let link = non_empty(item.link()).unwrap_or_default();

    put("title", item.title().map(String::from));
    put("link", non_empty(item.link()));
    put("guid", guid.clone());
    put("description", item.description().map(String::from));
    put("author", item.author().map(String::from));
    put("comments", item.comments().map(String::from));
    put("pubDate", item.pub_date().map(String::from));
    put("encoded", item.content().map(String::from));
    put("enclosure", item.enclosure().map(|e| e.url().to_string()));
    put(
        "source",
        item.source()
            .map(|s| s.title().unwrap_or_else(|| s.url()).to_string()),
    );
    if !item.categories().is_empty() {
        let names: Vec<&str> = item.categories().iter().map(|c| c.name()).collect();
        put("category", Some(names.join(", ")));
    }

    for elements in item.extensions().values() {
        for (name, occurrences) in elements {
            let values: Vec<String> = occurrences.iter().filter_map(extension_text).collect();
            put(name, Some(values.join(", ")));
        }
    }

    if let Some(dc) = item.dublin_core_ext() {
        let known: [(&str, &[String]); 10] = [
            ("creator", dc.creators()),
            ("contributor", dc.contributors()),
            ("date", dc.dates()),
            ("subject", dc.subjects()),
            ("publisher", dc.publishers()),
            ("rights", dc.rights()),
            ("identifier", dc.identifiers()),
            ("language", dc.languages()),
            ("type", dc.types()),
            ("format", dc.formats()),
        ];
        for (name, values) in known {
            put(name, Some(values.join(", ")));
        }
    }

    if let Some(itunes) = item.itunes_ext() {
        put("duration", itunes.duration().map(String::from));
        put("explicit", itunes.explicit().map(String::from));
        put("subtitle", itunes.subtitle().map(String::from));
        put("summary", itunes.summary().map(String::from));
        put("keywords", itunes.keywords().map(String::from));
        put("episode", itunes.episode().map(String::from));
        put("season", itunes.season().map(String::from));
        put("image", itunes.image().map(String::from));
    }

    let published_at = item
        .pub_date()
        .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
        .or_else(|| {
            fields
                .get("date")
                .and_then(|d| DateTime::parse_from_rfc3339(d.trim()).ok())
        })
        .map(|dt| dt.with_timezone(&Utc));

    let description = item
        .description()
        .or(item.content())
        .map(|d| decode_html_entities(d).to_string())
        .unwrap_or_default();

    ParsedItem {
        guid,
        title: item.title().unwrap_or_default().to_string(),
        description,
        link,
        published_at,
        fields,
    }
}

/// Text of an extension element: its own text, else a url-like attribute,
/// else the text of its children.
fn extension_text(ext: &Extension) -> Option<String> {
    if let Some(value) = non_empty(ext.value()) {
        return Some(value);
    }
    let attrs = ext.attrs();
    if let Some(value) = attrs
        .get("url")
        .or_else(|| attrs.get("href"))
        .or_else(|| attrs.values().next())
    {
        return Some(value.clone());
    }
    let children: Vec<String> = ext
        .children()
        .values()
        .flatten()
        .filter_map(extension_text)
        .collect();
    Some(children.join(", ")).filter(|v| !v.is_empty())
}

fn from_feed_rs(body: &str) -> Result<Parts> {
    // An empty id means "no id in the source"; feed-rs would otherwise hash
    // link and title into one.
    let parser = parser::Builder::new()
        .id_generator(|_, _, _| String::new())
        .build();
    let feed = parser
        .parse(body.as_bytes())
        .map_err(|e| TributaryError::FeedParse(e.to_string()))?;

    let title = feed
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| TributaryError::FeedParse("channel has no <title>".into()))?;
    let description = feed.description.as_ref().map(decode_text).unwrap_or_default();
    let items = feed.entries.into_iter().map(normalize_entry).collect();
    Ok((title, description, items))
}

fn decode_text(text: &Text) -> String {
    decode_html_entities(&text.content).to_string()
}

fn normalize_entry(entry: Entry) -> ParsedItem {
    let mut fields = BTreeMap::new();

    let guid = non_empty(Some(entry.id.as_str()));
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default();
    let link = entry
        .links
        .first()
        .map(|l| l.href.clone())
        .unwrap_or_default();
    let content = entry
        .content
        .as_ref()
        .and_then(|c| c.body.as_deref())
        .map(|b| decode_html_entities(b).to_string());
    let description = entry
        .summary
        .as_ref()
        .map(decode_text)
        .or_else(|| content.clone())
        .unwrap_or_default();
    let published_at = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.with_timezone(&Utc));

    if let Some(guid) = &guid {
        fields.insert("id".to_string(), guid.clone());
    }
    if entry.title.is_some() {
        fields.insert("title".to_string(), title.clone());
    }
    if !link.is_empty() {
        fields.insert("link".to_string(), link.clone());
    }
    if entry.summary.is_some() {
        fields.insert("summary".to_string(), description.clone());
    }
    if let Some(content) = content {
        fields.insert("content".to_string(), content);
    }
    if let Some(published) = entry.published {
        fields.insert("published".to_string(), published.to_rfc3339());
    }
    if let Some(updated) = entry.updated {
        fields.insert("updated".to_string(), updated.to_rfc3339());
    }
    if let Some(author) = entry.authors.first() {
        fields.insert("author".to_string(), author.name.clone());
    }
    if !entry.categories.is_empty() {
        let terms: Vec<&str> = entry.categories.iter().map(|c| c.term.as_str()).collect();
        fields.insert("category".to_string(), terms.join(", "));
    }

    ParsedItem {
        guid,
        title,
        description,
        link,
        published_at,
        fields,
    }
}
