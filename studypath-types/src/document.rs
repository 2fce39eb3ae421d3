//! The composite plan document.
//!
//! This is the shape the application works with: one subject's profile
//! plus everything attached to it. The offline manager decomposes it into
//! per-collection writes on save and splices it back together on load.

use crate::records::{Exam, ExamResult, FlashcardDeck, ScheduleItem, SubjectProfile};
use crate::SubjectId;
use serde::{Deserialize, Serialize};

/// A subject's complete study plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub profile: SubjectProfile,
    #[serde(default)]
    pub schedule: Vec<ScheduleItem>,
    #[serde(default)]
    pub exams: Vec<Exam>,
    #[serde(default)]
    pub results: Vec<ExamResult>,
    #[serde(default)]
    pub decks: Vec<FlashcardDeck>,
}

impl PlanDocument {
    /// Creates an empty plan around a profile.
    #[must_use]
    pub fn new(profile: SubjectProfile) -> Self {
        Self {
            profile,
            schedule: Vec::new(),
            exams: Vec::new(),
            results: Vec::new(),
            decks: Vec::new(),
        }
    }

    /// The subject this plan belongs to.
    #[must_use]
    pub fn subject(&self) -> &SubjectId {
        &self.profile.subject
    }
}
