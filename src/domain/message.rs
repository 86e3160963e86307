//! Symbolic outcome kinds.
//!
//! The engine never produces display text. Errors and successes are reported
//! as [`MessageKey`]s that a presentation layer resolves to strings.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKey {
    InvalidUrl,
    AlreadyExists,
    ParserError,
    NetworkError,
    Downloaded,
}

impl MessageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::InvalidUrl => "errors.invalidUrl",
            MessageKey::AlreadyExists => "errors.alreadyExist",
            MessageKey::ParserError => "errors.parserError",
            MessageKey::NetworkError => "errors.networkError",
            MessageKey::Downloaded => "success.downloaded",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a submitted URL was rejected before any network access.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationError {
    #[error("not a valid feed URL")]
    InvalidUrl,

    #[error("feed is already subscribed")]
    AlreadyExists,
}

impl ValidationError {
    pub fn message_key(self) -> MessageKey {
        match self {
            ValidationError::InvalidUrl => MessageKey::InvalidUrl,
            ValidationError::AlreadyExists => MessageKey::AlreadyExists,
        }
    }
}

/// Why an in-flight submission failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessError {
    #[error("feed could not be downloaded")]
    Network,

    #[error("resource is not a valid RSS feed")]
    Parser,
}

impl ProcessError {
    pub fn message_key(self) -> MessageKey {
        match self {
            ProcessError::Network => MessageKey::NetworkError,
            ProcessError::Parser => MessageKey::ParserError,
        }
    }
}
