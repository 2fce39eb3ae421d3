//! Domain records persisted by the store.
//!
//! One record type per collection. Records are plain serde structs; the
//! store keeps them as JSON blobs and extracts the indexed fields
//! (subject, date, kind) into real columns at write time.

use crate::{RecordId, SubjectId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of a schedule item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleItemKind {
    /// A timetabled study session.
    Study,
    /// A revision slot ahead of an exam.
    Revision,
    /// Homework or coursework.
    Homework,
    /// A scheduled break.
    Break,
}

/// A single entry on the study schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: RecordId,
    pub subject: SubjectId,
    pub kind: ScheduleItemKind,
    pub title: String,
    pub date: NaiveDate,
    /// Start of the slot, minutes from midnight.
    pub start_minute: u16,
    pub duration_minutes: u16,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ScheduleItem {
    /// Creates a new schedule item with a fresh record ID.
    #[must_use]
    pub fn new(
        subject: SubjectId,
        kind: ScheduleItemKind,
        title: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: RecordId::new(),
            subject,
            kind,
            title: title.into(),
            date,
            start_minute: 0,
            duration_minutes: 60,
            completed: false,
            notes: None,
        }
    }
}

/// An upcoming or past exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    pub id: RecordId,
    pub subject: SubjectId,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u16>,
}

impl Exam {
    /// Creates a new exam with a fresh record ID.
    #[must_use]
    pub fn new(subject: SubjectId, title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: RecordId::new(),
            subject,
            title: title.into(),
            date,
            board: None,
            location: None,
            duration_minutes: None,
        }
    }
}

/// The marked outcome of an exam or mock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: RecordId,
    pub subject: SubjectId,
    /// The exam this result belongs to, if it was scheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<RecordId>,
    pub date: NaiveDate,
    pub marks_awarded: u32,
    pub marks_total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

/// A single flashcard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// A named deck of flashcards for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardDeck {
    pub id: RecordId,
    pub subject: SubjectId,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Flashcard>,
}

impl FlashcardDeck {
    /// Creates an empty deck with a fresh record ID.
    #[must_use]
    pub fn new(subject: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            subject,
            name: name.into(),
            cards: Vec::new(),
        }
    }
}

/// Per-subject profile: the scalar fields of the composite plan document.
/// Keyed by subject id, so there is exactly one profile row per subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub subject: SubjectId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_exam_date: Option<NaiveDate>,
    #[serde(default)]
    pub weekly_study_minutes: u32,
    /// Opaque application settings synced through the profile endpoint.
    #[serde(default)]
    pub settings: serde_json::Value,
}

impl SubjectProfile {
    /// Creates a profile with empty settings.
    #[must_use]
    pub fn new(subject: SubjectId, display_name: impl Into<String>) -> Self {
        Self {
            subject,
            display_name: display_name.into(),
            target_grade: None,
            final_exam_date: None,
            weekly_study_minutes: 0,
            settings: serde_json::Value::Null,
        }
    }
}
