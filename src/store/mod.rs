//! Reactive application state.
//!
//! [`StateStore`] owns the [`AppState`] aggregate and is the only way to
//! change it. Each mutating method applies its whole change first, then
//! reports it to every registered [`Observer`] exactly once, synchronously.
//! [`StateHandle`] shares one store between the submission workflow and the
//! polling scheduler.

pub mod change;
pub mod merge;

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::{
    AppState, Feed, FormState, FormStatus, NewPost, Post, PostId, ProcessError, ProcessState,
    ProcessStatus, ValidationError,
};

pub use change::{Observer, StateChange, StatePath};

pub struct StateStore {
    state: AppState,
    next_post_id: u64,
    observers: Vec<Box<dyn Observer>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            state: AppState::default(),
            next_post_id: 1,
            observers: Vec::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    fn notify(&mut self, path: StatePath) {
        let state = &self.state;
        let change = match path {
            StatePath::Feeds => StateChange::Feeds(&state.feeds),
            StatePath::Posts => StateChange::Posts(&state.posts),
            StatePath::Process => StateChange::Process(&state.process),
            StatePath::Form => StateChange::Form(&state.form),
            StatePath::ReadPostIds => StateChange::ReadPostIds(&state.read_post_ids),
            StatePath::LastReadPostId => StateChange::LastReadPostId(state.last_read_post_id),
        };

        tracing::trace!(path = %path, observers = self.observers.len(), "State changed");
        for observer in &mut self.observers {
            observer.on_change(&change);
        }
    }

    /// Returns false when the status was already current.
    pub fn set_process(&mut self, state: ProcessState, error: Option<ProcessError>) -> bool {
        let status = ProcessStatus::new(state, error);
        if self.state.process == status {
            return false;
        }
        self.state.process = status;
        self.notify(StatePath::Process);
        true
    }

    /// Returns false when the status was already current.
    pub fn set_form(&mut self, state: FormState, error: Option<ValidationError>) -> bool {
        let status = FormStatus::new(state, error);
        if self.state.form == status {
            return false;
        }
        self.state.form = status;
        self.notify(StatePath::Form);
        true
    }

    /// Append a feed in subscription order. A feed whose link is already
    /// subscribed is refused and nothing is notified.
    pub fn add_feed(&mut self, feed: Feed) -> bool {
        if self.state.has_feed(&feed.link) {
            tracing::warn!(feed = %feed.link, "Refusing duplicate feed");
            return false;
        }
        self.state.feeds.push(feed);
        self.notify(StatePath::Feeds);
        true
    }

    /// Assign ids to `new_posts` and put them, in the given order, above
    /// every existing post.
    pub fn prepend_posts(&mut self, new_posts: Vec<NewPost>) -> Vec<PostId> {
        if new_posts.is_empty() {
            return Vec::new();
        }

        let mut ids = Vec::with_capacity(new_posts.len());
        let mut fresh: Vec<Post> = new_posts
            .into_iter()
            .map(|new_post| {
                let id = self.allocate_id();
                ids.push(id);
                Post::from_new(id, new_post)
            })
            .collect();

        fresh.append(&mut self.state.posts);
        self.state.posts = fresh;
        self.notify(StatePath::Posts);
        ids
    }

    fn allocate_id(&mut self) -> PostId {
        let id = PostId::new(self.next_post_id);
        self.next_post_id += 1;
        id
    }

    /// Set the newest-seen marker of each listed feed. Unknown links and
    /// unchanged markers are skipped; observers hear about it only if at
    /// least one marker moved.
    pub fn advance_markers(&mut self, markers: &[(String, String)]) -> usize {
        let mut moved = 0;
        for (link, marker) in markers {
            if let Some(feed) = self.state.feeds.iter_mut().find(|f| &f.link == link) {
                if feed.newest_marker.as_deref() != Some(marker.as_str()) {
                    feed.newest_marker = Some(marker.clone());
                    moved += 1;
                }
            }
        }

        if moved > 0 {
            self.notify(StatePath::Feeds);
        }
        moved
    }

    /// Record a post as read. Unknown and already-read ids are ignored.
    pub fn mark_as_read(&mut self, id: PostId) -> bool {
        if self.state.post(id).is_none() || self.state.is_read(id) {
            return false;
        }

        self.state.read_post_ids.insert(id);
        self.notify(StatePath::ReadPostIds);

        self.state.last_read_post_id = Some(id);
        self.notify(StatePath::LastReadPostId);
        true
    }

    /// [`mark_as_read`](Self::mark_as_read) for an id harvested as text from
    /// the view. Empty or unparsable ids are ignored.
    pub fn mark_as_read_str(&mut self, raw: &str) -> bool {
        match raw.parse::<PostId>() {
            Ok(id) => self.mark_as_read(id),
            Err(_) => {
                tracing::debug!(id = raw, "Ignoring unparsable post id");
                false
            }
        }
    }
}

/// Shared, lock-protected access to one [`StateStore`].
///
/// Closures given to [`update`](Self::update) are synchronous, so a write can
/// never straddle an `.await` and observers always see complete mutations.
#[derive(Clone, Default)]
pub struct StateHandle {
    inner: Arc<Mutex<StateStore>>,
}

impl StateHandle {
    pub fn new(store: StateStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let store = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(store.state())
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut StateStore) -> R) -> R {
        let mut store = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *store)
    }

    pub fn subscribe(&self, observer: Box<dyn Observer>) {
        self.update(|store| store.subscribe(observer));
    }

    pub fn snapshot(&self) -> AppState {
        self.read(AppState::clone)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::ParsedItem;

    const FEED: &str = "https://example.com/rss";

    type Log = Arc<Mutex<Vec<StatePath>>>;

    fn recording_store() -> (StateStore, Log) {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let mut store = StateStore::new();
        let sink = log.clone();
        store.subscribe(Box::new(move |change: &StateChange<'_>| {
            sink.lock().unwrap().push(change.path());
        }));
        (store, log)
    }

    fn new_post(key: &str) -> NewPost {
        NewPost {
            feed_link: FEED.to_string(),
            item: ParsedItem {
                guid: Some(key.to_string()),
                title: key.to_string(),
                description: String::new(),
                link: format!("https://example.com/{key}"),
                published_at: None,
                fields: BTreeMap::new(),
            },
        }
    }

    fn titles(store: &StateStore) -> Vec<String> {
        store.state().posts.iter().map(|p| p.title.clone()).collect()
    }

    #[test]
    fn test_process_write_notifies_once() {
        let (mut store, log) = recording_store();

        assert!(store.set_process(ProcessState::Getting, None));
        assert_eq!(*log.lock().unwrap(), vec![StatePath::Process]);
        assert_eq!(store.state().process.state, ProcessState::Getting);
    }

    #[test]
    fn test_identical_writes_are_filtered() {
        let (mut store, log) = recording_store();

        assert!(!store.set_process(ProcessState::Ready, None));
        assert!(!store.set_form(FormState::Idle, None));
        assert!(store.set_form(FormState::Invalid, Some(ValidationError::InvalidUrl)));
        assert!(!store.set_form(FormState::Invalid, Some(ValidationError::InvalidUrl)));
        assert!(store.set_form(FormState::Invalid, Some(ValidationError::AlreadyExists)));

        assert_eq!(*log.lock().unwrap(), vec![StatePath::Form, StatePath::Form]);
    }

    #[test]
    fn test_observer_sees_completed_write() {
        let mut store = StateStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(Box::new(move |change: &StateChange<'_>| {
            if let StateChange::Posts(posts) = change {
                sink.lock().unwrap().push(posts.len());
            }
        }));

        store.prepend_posts(vec![new_post("a"), new_post("b"), new_post("c")]);
        assert_eq!(*seen.lock().unwrap(), vec![3]);
    }

    #[test]
    fn test_prepend_keeps_existing_order() {
        let (mut store, log) = recording_store();

        store.prepend_posts(vec![new_post("a"), new_post("b")]);
        store.prepend_posts(vec![new_post("x"), new_post("y")]);

        assert_eq!(titles(&store), vec!["x", "y", "a", "b"]);
        assert_eq!(*log.lock().unwrap(), vec![StatePath::Posts, StatePath::Posts]);
    }

    #[test]
    fn test_empty_prepend_is_silent() {
        let (mut store, log) = recording_store();
        assert!(store.prepend_posts(Vec::new()).is_empty());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_post_ids_are_unique_and_increasing() {
        let mut store = StateStore::new();
        let first = store.prepend_posts(vec![new_post("a"), new_post("b")]);
        let second = store.prepend_posts(vec![new_post("c")]);

        let all: Vec<PostId> = first.iter().chain(second.iter()).copied().collect();
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_add_feed_refuses_duplicate_link() {
        let (mut store, log) = recording_store();

        assert!(store.add_feed(Feed::new(FEED.into(), "One".into(), String::new())));
        assert!(!store.add_feed(Feed::new(FEED.into(), "Two".into(), String::new())));

        assert_eq!(store.state().feeds.len(), 1);
        assert_eq!(store.state().feeds[0].title, "One");
        assert_eq!(*log.lock().unwrap(), vec![StatePath::Feeds]);
    }

    #[test]
    fn test_advance_markers() {
        let (mut store, log) = recording_store();
        store.add_feed(Feed::new(FEED.into(), "One".into(), String::new()));

        let markers = vec![(FEED.to_string(), "g-1".to_string())];
        assert_eq!(store.advance_markers(&markers), 1);
        assert_eq!(store.advance_markers(&markers), 0);
        assert_eq!(
            store.advance_markers(&[("https://unknown.example/rss".into(), "g".into())]),
            0
        );

        assert_eq!(store.state().feeds[0].newest_marker.as_deref(), Some("g-1"));
        assert_eq!(*log.lock().unwrap(), vec![StatePath::Feeds, StatePath::Feeds]);
    }

    #[test]
    fn test_mark_as_read() {
        let (mut store, log) = recording_store();
        let ids = store.prepend_posts(vec![new_post("a")]);
        log.lock().unwrap().clear();

        assert!(store.mark_as_read(ids[0]));
        assert!(store.state().is_read(ids[0]));
        assert_eq!(store.state().last_read_post_id, Some(ids[0]));
        assert_eq!(
            *log.lock().unwrap(),
            vec![StatePath::ReadPostIds, StatePath::LastReadPostId]
        );

        assert!(!store.mark_as_read(ids[0]));
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_mark_as_read_ignores_unknown_ids() {
        let mut store = StateStore::new();
        store.prepend_posts(vec![new_post("a")]);

        assert!(!store.mark_as_read(PostId::new(999)));
        assert!(!store.mark_as_read_str(""));
        assert!(!store.mark_as_read_str("not-an-id"));
        assert!(store.state().read_post_ids.is_empty());
    }

    #[test]
    fn test_mark_as_read_str() {
        let mut store = StateStore::new();
        let ids = store.prepend_posts(vec![new_post("a")]);

        assert!(store.mark_as_read_str(&ids[0].to_string()));
        assert_eq!(store.state().unread_count(), 0);
    }

    #[test]
    fn test_handle_shares_one_store() {
        let handle = StateHandle::default();
        let other = handle.clone();

        other.update(|store| store.prepend_posts(vec![new_post("a")]));
        assert_eq!(handle.read(|state| state.posts.len()), 1);
        assert_eq!(handle.snapshot().posts[0].title, "a");
    }
}
