//! Completion and parental review records.
//!
//! # Invariants
//! - One completion per assignment.
//! - One review per completion; the reviewer must be a parent.
//! - Photos are referenced by file name only; bytes live outside core.

use super::assignment::AssignmentId;
use super::person::PersonId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub type CompletionId = i64;
pub type ReviewId = i64;

/// Record that an assignment was finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub id: CompletionId,
    pub assignment_id: AssignmentId,
    pub completed_at: NaiveDateTime,
    pub actual_minutes: u32,
    pub notes: Option<String>,
    pub photo_filename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCompletion {
    pub assignment_id: AssignmentId,
    pub actual_minutes: u32,
    pub notes: Option<String>,
    pub photo_filename: Option<String>,
}

/// Parent approval or rejection of a completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentalReview {
    pub id: ReviewId,
    pub completion_id: CompletionId,
    pub reviewer_id: PersonId,
    pub approved: bool,
    pub review_notes: Option<String>,
    pub reviewed_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub completion_id: CompletionId,
    pub reviewer_id: PersonId,
    pub approved: bool,
    pub review_notes: Option<String>,
}
