//! Chore domain model.
//!
//! # Responsibility
//! - Define the chore master record and its optional recurrence rule.
//!
//! # Invariants
//! - `room` and `task` are non-blank.
//! - `estimated_minutes` is at least 1.
//! - `recurrence.is_some()` is the recurrence flag; there is no separate
//!   boolean that could disagree with it.

use super::recurrence::{Recurrence, RecurrenceKind};
use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// SQLite row id of `chores`.
pub type ChoreId = i64;

/// Chore master record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chore {
    pub id: ChoreId,
    /// Room or area the chore belongs to (e.g. `Kitchen`).
    pub room: String,
    pub task: String,
    /// Free-text frequency label shown to people (`Daily`, `Weekly`, ...).
    /// Scheduling uses `recurrence` only.
    pub frequency: String,
    pub estimated_minutes: u32,
    pub recurrence: Option<Recurrence>,
}

impl Chore {
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn recurrence_kind(&self) -> Option<RecurrenceKind> {
        self.recurrence.as_ref().map(Recurrence::kind)
    }

    /// Validates field-level invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_chore_fields(
            &self.room,
            &self.task,
            self.estimated_minutes,
            self.recurrence.as_ref(),
        )
    }
}

/// Insert model for a chore that has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChore {
    pub room: String,
    pub task: String,
    pub frequency: String,
    pub estimated_minutes: u32,
    pub recurrence: Option<Recurrence>,
}

impl NewChore {
    /// Creates a non-recurring chore.
    pub fn new(
        room: impl Into<String>,
        task: impl Into<String>,
        frequency: impl Into<String>,
        estimated_minutes: u32,
    ) -> Self {
        Self {
            room: room.into(),
            task: task.into(),
            frequency: frequency.into(),
            estimated_minutes,
            recurrence: None,
        }
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_chore_fields(
            &self.room,
            &self.task,
            self.estimated_minutes,
            self.recurrence.as_ref(),
        )
    }
}

/// Checks a recurrence rule in isolation.
pub fn validate_recurrence(recurrence: Option<&Recurrence>) -> Result<(), ValidationError> {
    match recurrence {
        Some(Recurrence::SpecificDays(days)) if days.is_empty() => {
            Err(ValidationError::EmptyRecurrenceDays)
        }
        _ => Ok(()),
    }
}

fn validate_chore_fields(
    room: &str,
    task: &str,
    estimated_minutes: u32,
    recurrence: Option<&Recurrence>,
) -> Result<(), ValidationError> {
    require_text("room", room)?;
    require_text("task", task)?;
    if estimated_minutes == 0 {
        return Err(ValidationError::NonPositiveEstimate);
    }
    validate_recurrence(recurrence)
}
