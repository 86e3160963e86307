//! Plain-text view for the command line.
//!
//! [`ConsoleView`] is an [`Observer`] that prints each state change as it
//! happens. It also owns the English strings for the engine's
//! [`MessageKey`]s.

use std::collections::HashSet;
use std::io::Write;

use crate::domain::{FormState, MessageKey, PostId, ProcessState};
use crate::store::{Observer, StateChange};

pub fn message(key: MessageKey) -> &'static str {
    match key {
        MessageKey::InvalidUrl => "The link must be a valid URL",
        MessageKey::AlreadyExists => "RSS already exists",
        MessageKey::ParserError => "The resource does not contain valid RSS",
        MessageKey::NetworkError => "Network error, please try again later",
        MessageKey::Downloaded => "RSS loaded successfully",
    }
}

pub struct ConsoleView<W: Write + Send> {
    out: W,
    shown: HashSet<PostId>,
    feed_count: usize,
}

impl<W: Write + Send> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: HashSet::new(),
            feed_count: 0,
        }
    }

    fn render(&mut self, change: &StateChange<'_>) -> std::io::Result<()> {
        match change {
            StateChange::Process(status) => match status.state {
                ProcessState::Ready => {}
                ProcessState::Getting => writeln!(self.out, "Loading...")?,
                ProcessState::Finished => {
                    writeln!(self.out, "{}", message(MessageKey::Downloaded))?
                }
                ProcessState::Failed => {
                    if let Some(error) = status.error {
                        writeln!(self.out, "Error: {}", message(error.message_key()))?;
                    }
                }
            },
            StateChange::Form(status) => {
                if let (FormState::Invalid, Some(error)) = (status.state, status.error) {
                    writeln!(self.out, "Error: {}", message(error.message_key()))?;
                }
            }
            StateChange::Feeds(feeds) => {
                for feed in feeds.iter().skip(self.feed_count) {
                    writeln!(self.out, "Feed: {}", feed.display_title())?;
                    if !feed.description.is_empty() {
                        writeln!(self.out, "      {}", feed.description)?;
                    }
                }
                self.feed_count = feeds.len();
            }
            StateChange::Posts(posts) => {
                // New posts are always on top; stop at the first one already shown.
                let fresh: Vec<_> = posts
                    .iter()
                    .take_while(|post| !self.shown.contains(&post.id))
                    .collect();
                for post in fresh.iter().rev() {
                    writeln!(self.out, "[{}] {}  <{}>", post.id, post.display_title(), post.link)?;
                }
                self.shown.extend(fresh.iter().map(|post| post.id));
            }
            StateChange::ReadPostIds(ids) => {
                tracing::debug!(read = ids.len(), "Read set updated");
            }
            StateChange::LastReadPostId(id) => {
                if let Some(id) = id {
                    writeln!(self.out, "Marked [{}] as read", id)?;
                }
            }
        }
        self.out.flush()
    }
}

impl<W: Write + Send> Observer for ConsoleView<W> {
    fn on_change(&mut self, change: &StateChange<'_>) {
        if let Err(e) = self.render(change) {
            tracing::error!("Failed to write to console: {}", e);
        }
    }
}
