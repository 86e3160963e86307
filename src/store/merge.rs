//! New-post detection.
//!
//! An incoming item is new when no known post of the same feed shares its
//! key (guid, else link). This is a set difference, so it holds up when a
//! feed reorders its items or drops old ones.

use std::collections::HashSet;

use crate::domain::{NewPost, ParsedItem, Post};

/// Items of `feed_link` not yet present in `known`, in source order.
///
/// Duplicate keys inside `incoming` are collapsed to their first occurrence.
pub fn unseen(feed_link: &str, incoming: Vec<ParsedItem>, known: &[Post]) -> Vec<NewPost> {
    let mut seen: HashSet<String> = known
        .iter()
        .filter(|post| post.feed_link == feed_link)
        .map(|post| post.dedup_key().to_string())
        .collect();

    incoming
        .into_iter()
        .filter(|item| seen.insert(item.dedup_key().to_string()))
        .map(|item| NewPost {
            feed_link: feed_link.to_string(),
            item,
        })
        .collect()
}
