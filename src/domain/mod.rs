pub mod feed;
pub mod message;
pub mod post;
pub mod state;

pub use feed::{Feed, ParsedFeed};
pub use message::{MessageKey, ProcessError, ValidationError};
pub use post::{DedupKey, NewPost, ParsedItem, Post, PostId};
pub use state::{AppState, FormState, FormStatus, ProcessState, ProcessStatus};
