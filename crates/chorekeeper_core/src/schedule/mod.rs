//! Recurring assignment scheduling.
//!
//! # Responsibility
//! - Decide which recurring chores are due on a calendar date.
//! - Pick an assignee per due chore through an injectable strategy.
//! - Create at most one assignment per (chore, date).
//!
//! # Invariants
//! - The generator only inserts; it never updates or deletes assignments.
//! - A (chore, date) conflict is a silent skip, not an error.
//! - An empty person pool skips the affected chores and is reported in
//!   `GenerationReport::skipped_without_assignee`; it does not abort the run.
//! - A stored chore row with unusable recurrence settings is skipped and
//!   counted in `GenerationReport::skipped_invalid`.
//! - `monthly` chores are never scheduled and `weekly` chores land on Mondays.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod calendar;
pub mod generator;
pub mod strategy;

pub use calendar::{chore_is_due, is_due_on, parse_target_date, weekday_code, WEEKLY_DAY};
pub use generator::{
    generate_recurring_assignments, GeneratedAssignment, GenerationReport, InvalidChoreRow,
    RecurrenceStore, RecurringAssignmentGenerator, RecurringChores,
};
pub use strategy::{
    Assignee, AssigneePool, AssignmentStrategy, LeastRecentlyAssigned, RoundRobin, StrategyKind,
    UniformRandom,
};

/// Errors surfaced by scheduling operations.
#[derive(Debug)]
pub enum ScheduleError {
    /// Target date input is not a valid `YYYY-MM-DD` calendar date.
    InvalidDate { input: String, reason: String },
    /// No people exist to receive an assignment.
    EmptyPersonPool,
    /// Persistence failure other than the tolerated (chore, date) conflict.
    StoreUnavailable(RepoError),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate { input, reason } => {
                write!(f, "invalid target date `{input}`: {reason}")
            }
            Self::EmptyPersonPool => write!(f, "no people available to assign"),
            Self::StoreUnavailable(err) => write!(f, "chore store unavailable: {err}"),
        }
    }
}

impl Error for ScheduleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ScheduleError {
    fn from(value: RepoError) -> Self {
        Self::StoreUnavailable(value)
    }
}

impl From<rusqlite::Error> for ScheduleError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StoreUnavailable(RepoError::from(value))
    }
}
