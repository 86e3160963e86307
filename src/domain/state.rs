use std::collections::BTreeSet;

use serde::Serialize;

use super::feed::Feed;
use super::message::{ProcessError, ValidationError};
use super::post::{Post, PostId};

/// Lifecycle of the submission currently in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    #[default]
    Ready,
    Getting,
    Finished,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStatus {
    pub state: ProcessState,
    pub error: Option<ProcessError>,
}

impl ProcessStatus {
    pub fn new(state: ProcessState, error: Option<ProcessError>) -> Self {
        Self { state, error }
    }
}

/// Lifecycle of input validation feedback. `Idle` is the cleared state
/// between submissions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    #[default]
    Idle,
    Valid,
    #[serde(rename = "unvalid")]
    Invalid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormStatus {
    pub state: FormState,
    pub error: Option<ValidationError>,
}

impl FormStatus {
    pub fn new(state: FormState, error: Option<ValidationError>) -> Self {
        Self { state, error }
    }
}

/// Root aggregate of everything the view renders.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub process: ProcessStatus,
    pub form: FormStatus,
    pub feeds: Vec<Feed>,
    /// Newest first.
    pub posts: Vec<Post>,
    pub read_post_ids: BTreeSet<PostId>,
    pub last_read_post_id: Option<PostId>,
}

impl AppState {
    pub fn has_feed(&self, link: &str) -> bool {
        self.feeds.iter().any(|feed| feed.link == link)
    }

    pub fn feed(&self, link: &str) -> Option<&Feed> {
        self.feeds.iter().find(|feed| feed.link == link)
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn posts_for_feed<'a>(&'a self, link: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts.iter().filter(move |post| post.feed_link == link)
    }

    pub fn is_read(&self, id: PostId) -> bool {
        self.read_post_ids.contains(&id)
    }

    pub fn unread_count(&self) -> usize {
        self.posts.iter().filter(|post| !self.is_read(post.id)).count()
    }
}
