use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{Feed, FormStatus, Post, PostId, ProcessStatus};

/// The tracked fields of [`AppState`](crate::domain::AppState).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatePath {
    Feeds,
    Posts,
    Process,
    Form,
    ReadPostIds,
    LastReadPostId,
}

impl StatePath {
    pub const ALL: [StatePath; 6] = [
        StatePath::Feeds,
        StatePath::Posts,
        StatePath::Process,
        StatePath::Form,
        StatePath::ReadPostIds,
        StatePath::LastReadPostId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatePath::Feeds => "feeds",
            StatePath::Posts => "posts",
            StatePath::Process => "process",
            StatePath::Form => "form",
            StatePath::ReadPostIds => "readPostIds",
            StatePath::LastReadPostId => "lastReadPostId",
        }
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed write to one tracked field, carrying the field's new value.
#[derive(Debug, Clone, Copy)]
pub enum StateChange<'a> {
    Feeds(&'a [Feed]),
    Posts(&'a [Post]),
    Process(&'a ProcessStatus),
    Form(&'a FormStatus),
    ReadPostIds(&'a BTreeSet<PostId>),
    LastReadPostId(Option<PostId>),
}

impl StateChange<'_> {
    pub fn path(&self) -> StatePath {
        match self {
            StateChange::Feeds(_) => StatePath::Feeds,
            StateChange::Posts(_) => StatePath::Posts,
            StateChange::Process(_) => StatePath::Process,
            StateChange::Form(_) => StatePath::Form,
            StateChange::ReadPostIds(_) => StatePath::ReadPostIds,
            StateChange::LastReadPostId(_) => StatePath::LastReadPostId,
        }
    }
}

/// Receives every state write synchronously, before the writer regains
/// control.
///
/// Observers run while the state lock is held and must not call back into
/// the [`StateHandle`](super::StateHandle).
pub trait Observer: Send {
    fn on_change(&mut self, change: &StateChange<'_>);
}

impl<F> Observer for F
where
    F: FnMut(&StateChange<'_>) + Send,
{
    fn on_change(&mut self, change: &StateChange<'_>) {
        self(change)
    }
}
