//! Queued-operation types for the offline sync queue.
//!
//! Every local mutation made through the offline manager is recorded as a
//! `QueuedOperation`, durably stored as a `QueueEntry`, and later replayed
//! against the remote service in insertion order.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a queued mutation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl OperationKind {
    /// Stable string form, used as the stored column value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(Error::InvalidValue(format!("operation kind: {other}"))),
        }
    }
}

/// Which remote entity a queued mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Schedule,
    Exam,
    Result,
    Flashcard,
    Config,
    Session,
}

impl EntityKind {
    /// Stable string form, used as the stored column value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::Exam => "exam",
            Self::Result => "result",
            Self::Flashcard => "flashcard",
            Self::Config => "config",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schedule" => Ok(Self::Schedule),
            "exam" => Ok(Self::Exam),
            "result" => Ok(Self::Result),
            "flashcard" => Ok(Self::Flashcard),
            "config" => Ok(Self::Config),
            "session" => Ok(Self::Session),
            other => Err(Error::InvalidValue(format!("entity kind: {other}"))),
        }
    }
}

/// Lifecycle state of a stored queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Waiting for the next drain.
    Pending,
    /// Currently being replayed against the remote service.
    Syncing,
    /// Gave up after exhausting retries; needs user attention.
    Failed,
}

impl SyncStatus {
    /// Stable string form, used as the stored column value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Syncing => "syncing",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "syncing" => Ok(Self::Syncing),
            "failed" => Ok(Self::Failed),
            other => Err(Error::InvalidValue(format!("sync status: {other}"))),
        }
    }
}

/// A mutation awaiting replay against the remote service.
///
/// The payload is opaque to the queue; the processor hands it to the
/// matching remote endpoint as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedOperation {
    pub kind: OperationKind,
    pub entity: EntityKind,
    pub payload: serde_json::Value,
}

impl QueuedOperation {
    /// Creates a queued operation.
    #[must_use]
    pub fn new(kind: OperationKind, entity: EntityKind, payload: serde_json::Value) -> Self {
        Self {
            kind,
            entity,
            payload,
        }
    }
}

/// A durably stored queue entry, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Store-assigned monotonic id; replay order is ascending id.
    pub id: i64,
    pub op: QueuedOperation,
    /// Wall-clock creation time, milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub status: SyncStatus,
    /// Number of failed replay attempts so far.
    pub attempts: u32,
}
