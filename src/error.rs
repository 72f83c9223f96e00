//! Error types for the skill bridge

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Non-2xx status or malformed body from the completion backend.
    #[error("completion API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}
