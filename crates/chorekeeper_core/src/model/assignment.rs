//! Assignment model: one chore scheduled for one person on one date.
//!
//! # Invariants
//! - At most one assignment exists per (`chore_id`, `assigned_date`); the
//!   storage layer enforces this with a unique index.
//! - Generated assignments use `due_date == assigned_date`.

use super::chore::ChoreId;
use super::person::PersonId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// SQLite row id of `assignments`.
pub type AssignmentId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub chore_id: ChoreId,
    pub person_id: PersonId,
    pub assigned_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Insert model for an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    pub chore_id: ChoreId,
    pub person_id: PersonId,
    pub assigned_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl NewAssignment {
    /// Assignment due on the day it is assigned.
    pub fn same_day(chore_id: ChoreId, person_id: PersonId, date: NaiveDate) -> Self {
        Self {
            chore_id,
            person_id,
            assigned_date: date,
            due_date: Some(date),
            notes: None,
        }
    }
}
