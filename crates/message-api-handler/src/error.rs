//! Error types for the message handler

use message_api_persistence::StoreError;
use thiserror::Error;

/// Failures the handler cannot answer with a status of its own
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, HandlerError>;
