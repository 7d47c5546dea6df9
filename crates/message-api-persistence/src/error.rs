//! Error types for message store operations

use message_api_types::MessageId;
use thiserror::Error;

/// Message store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure (connection, query, transaction)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A staged insert collided with a stored message
    #[error("Message {0} already exists")]
    AlreadyExists(MessageId),

    /// A staged update or removal targets a message that is gone
    #[error("Message {0} not found")]
    NotFound(MessageId),

    /// A staged insert or update carries empty content
    #[error("Message {0} has empty content")]
    EmptyContent(MessageId),
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;
