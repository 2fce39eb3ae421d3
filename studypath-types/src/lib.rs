//! Core type definitions for StudyPath.
//!
//! This crate defines the fundamental types shared by the storage and sync
//! layers:
//! - Subject and record identifiers (UUID v7 for time-ordered record ids)
//! - Domain records (profile, schedule items, exams, results, flashcard decks)
//! - The composite plan document the application reads and writes
//! - Queued-operation types for the offline sync queue
//!
//! Everything UI- or AI-facing belongs in the application layers, not here.

mod document;
mod ids;
mod queue;
mod records;

pub use document::PlanDocument;
pub use ids::{RecordId, SubjectId};
pub use queue::{EntityKind, OperationKind, QueueEntry, QueuedOperation, SyncStatus};
pub use records::{
    Exam, ExamResult, Flashcard, FlashcardDeck, ScheduleItem, ScheduleItemKind, SubjectProfile,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}
