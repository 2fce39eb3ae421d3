//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite (including transaction aborts).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A query named an index the collection schema does not declare.
    #[error("unknown index '{index}' on collection '{collection}'")]
    UnknownIndex {
        collection: &'static str,
        index: String,
    },

    /// A record is missing its primary key or a stored row is malformed.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
