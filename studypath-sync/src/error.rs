//! Error types for the sync layer.

use studypath_types::{EntityKind, OperationKind};
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Network error (request failed before a response arrived).
    #[error("network error: {0}")]
    Network(String),

    /// The remote service answered with a non-success status.
    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] studypath_store::StoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An explicit sync was requested while the network monitor reports
    /// offline.
    #[error("cannot sync while offline")]
    Offline,

    /// The entity/operation pair has no remote endpoint.
    #[error("no remote endpoint for {kind} on {entity}")]
    UnsupportedOperation {
        entity: EntityKind,
        kind: OperationKind,
    },

    /// A queued payload is missing the fields its endpoint needs.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A blocking storage task panicked or was cancelled.
    #[error("task join error: {0}")]
    TaskJoin(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}
