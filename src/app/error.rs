use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum TributaryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

impl TributaryError {
    /// True for failures on the transport side of a fetch.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            TributaryError::Network(_) | TributaryError::Http(_) | TributaryError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TributaryError>;
