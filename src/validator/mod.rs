use url::Url;

use crate::domain::Feed;

pub use crate::domain::ValidationError;

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Check a submitted URL against syntax rules and the current subscriptions.
///
/// Syntax is checked first; the duplicate check compares against each feed's
/// `link` verbatim. Returns the first failing rule, or `None` when the URL
/// may be fetched.
pub fn validate(candidate: &str, feeds: &[Feed]) -> Option<ValidationError> {
    if !is_well_formed(candidate) {
        return Some(ValidationError::InvalidUrl);
    }

    if feeds.iter().any(|feed| feed.link == candidate) {
        return Some(ValidationError::AlreadyExists);
    }

    None
}

fn is_well_formed(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => {
            ALLOWED_SCHEMES.contains(&url.scheme())
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(link: &str) -> Feed {
        Feed::new(link.to_string(), "title".into(), "description".into())
    }

    #[test]
    fn test_accepts_new_url() {
        let feeds = vec![feed("https://example.com/a.xml")];
        assert_eq!(validate("https://example.com/feed.xml", &feeds), None);
        assert_eq!(validate("http://localhost:8080/rss", &[]), None);
    }

    #[test]
    fn test_rejects_malformed_urls() {
        for candidate in ["not a url", "", "example.com/rss", "https://", "ftp://example.com/rss", "mailto:a@b.c"] {
            assert_eq!(
                validate(candidate, &[]),
                Some(ValidationError::InvalidUrl),
                "{candidate:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_existing_feed() {
        let feeds = vec![feed("https://example.com/a.xml"), feed("https://example.com/b.xml")];
        assert_eq!(
            validate("https://example.com/b.xml", &feeds),
            Some(ValidationError::AlreadyExists)
        );
    }

    #[test]
    fn test_syntax_checked_before_duplicates() {
        // A link that slipped into state without validation still reports as invalid.
        let feeds = vec![feed("not a url")];
        assert_eq!(validate("not a url", &feeds), Some(ValidationError::InvalidUrl));
    }
}
