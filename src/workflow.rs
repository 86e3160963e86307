//! Handling of a single user-submitted feed URL.
//!
//! ```text
//! ready ─ invalid ─▶ ready (form = unvalid)
//! ready ─ valid ───▶ getting ─▶ finished | failed
//! ```

use std::sync::Arc;

use crate::domain::{FormState, ProcessError, ProcessState, ValidationError};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;
use crate::store::{merge, StateHandle};
use crate::validator::validate;

/// How a submission ended. All of it is also reflected in the state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Rejected(ValidationError),
    Failed(ProcessError),
    Added { link: String, new_posts: usize },
}

pub struct Submission {
    state: StateHandle,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
}

impl Submission {
    pub fn new(
        state: StateHandle,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            state,
            fetcher,
            normalizer,
        }
    }

    /// Validate, fetch, parse and merge one feed URL.
    ///
    /// Submissions are expected one at a time; the caller keeps its input
    /// disabled while the state is `Getting`.
    pub async fn submit(&self, raw_url: &str) -> SubmitOutcome {
        let url = raw_url.trim();

        let rejected = self.state.update(|store| {
            store.set_form(FormState::Idle, None);
            match validate(url, &store.state().feeds) {
                Some(error) => {
                    store.set_form(FormState::Invalid, Some(error));
                    Some(error)
                }
                None => {
                    store.set_form(FormState::Valid, None);
                    store.set_process(ProcessState::Getting, None);
                    None
                }
            }
        });
        if let Some(error) = rejected {
            tracing::info!(url, reason = %error, "Submission rejected");
            return SubmitOutcome::Rejected(error);
        }

        let body = match self.fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url, error = %e, "Failed to download feed");
                return self.fail(ProcessError::Network);
            }
        };

        let parsed = match self.normalizer.parse(&body, url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(url, error = %e, "Failed to parse feed");
                return self.fail(ProcessError::Parser);
            }
        };

        let (feed, items) = parsed.into_parts();
        let title = feed.title.clone();
        let added = self.state.update(|store| {
            if !store.add_feed(feed) {
                // Subscribed by someone else while this fetch was in flight.
                store.set_form(FormState::Invalid, Some(ValidationError::AlreadyExists));
                store.set_process(ProcessState::Ready, None);
                return None;
            }
            let new_posts = merge::unseen(url, items, &store.state().posts);
            let ids = store.prepend_posts(new_posts);
            store.set_process(ProcessState::Finished, None);
            Some(ids.len())
        });
        let Some(new_posts) = added else {
            tracing::info!(url, "Feed was subscribed during download, dropping result");
            return SubmitOutcome::Rejected(ValidationError::AlreadyExists);
        };

        tracing::info!(url, title = %title, new_posts, "Feed added");
        SubmitOutcome::Added {
            link: url.to_string(),
            new_posts,
        }
    }

    fn fail(&self, error: ProcessError) -> SubmitOutcome {
        self.state
            .update(|store| store.set_process(ProcessState::Failed, Some(error)));
        SubmitOutcome::Failed(error)
    }
}
