//! Daily assignment board use-case service.
//!
//! # Responsibility
//! - Manual assignment (upsert on chore + date).
//! - Day board, copy-from-previous-day and clear-day operations.
//!
//! # Invariants
//! - Manual assignment defaults `due_date` to the assigned date.
//! - Copy replaces the target day wholesale; it never merges.

use crate::model::assignment::{Assignment, AssignmentId, NewAssignment};
use crate::model::chore::ChoreId;
use crate::model::person::PersonId;
use crate::repo::assignment_repo::{AssignmentRepository, DayBoardEntry};
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for assignment use-cases.
#[derive(Debug)]
pub enum AssignmentServiceError {
    ChoreNotFound(ChoreId),
    PersonNotFound(PersonId),
    AssignmentNotFound(AssignmentId),
    /// No calendar day precedes the requested date.
    NoPreviousDay(NaiveDate),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for AssignmentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChoreNotFound(id) => write!(f, "chore not found: {id}"),
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::AssignmentNotFound(id) => write!(f, "assignment not found: {id}"),
            Self::NoPreviousDay(date) => write!(f, "no calendar day before {date}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent assignment state: {details}")
            }
        }
    }
}

impl Error for AssignmentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AssignmentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "chore",
                id,
            } => Self::ChoreNotFound(id),
            RepoError::NotFound {
                entity: "person",
                id,
            } => Self::PersonNotFound(id),
            RepoError::NotFound {
                entity: "assignment",
                id,
            } => Self::AssignmentNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Assignment service facade over repository implementations.
pub struct AssignmentService<R: AssignmentRepository> {
    repo: R,
}

impl<R: AssignmentRepository> AssignmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Assigns `chore_id` to `person_id` on `assigned_date`.
    ///
    /// An existing assignment for the same chore and date is re-pointed to
    /// the new person and due date.
    pub fn assign_chore(
        &self,
        chore_id: ChoreId,
        person_id: PersonId,
        assigned_date: NaiveDate,
        due_date: Option<NaiveDate>,
    ) -> Result<Assignment, AssignmentServiceError> {
        let assignment = NewAssignment {
            chore_id,
            person_id,
            assigned_date,
            due_date: Some(due_date.unwrap_or(assigned_date)),
            notes: None,
        };
        let id = self.repo.upsert_assignment(&assignment)?;
        info!(
            "event=assignment_upsert module=service status=ok assignment_id={} chore_id={} person_id={} date={}",
            id, chore_id, person_id, assigned_date
        );
        self.repo
            .get_assignment(id)?
            .ok_or(AssignmentServiceError::InconsistentState(
                "upserted assignment not found in read-back",
            ))
    }

    pub fn get_assignment(&self, id: AssignmentId) -> Result<Assignment, AssignmentServiceError> {
        self.repo
            .get_assignment(id)?
            .ok_or(AssignmentServiceError::AssignmentNotFound(id))
    }

    pub fn assignments_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Assignment>, AssignmentServiceError> {
        Ok(self.repo.list_for_date(date)?)
    }

    /// Board rows for `date` with completion and review status.
    pub fn day_board(&self, date: NaiveDate) -> Result<Vec<DayBoardEntry>, AssignmentServiceError> {
        Ok(self.repo.day_board(date)?)
    }

    /// Replaces `date` assignments with the previous day's (chore, person)
    /// pairs, due on `date`. Returns the number copied.
    pub fn copy_from_previous_day(&self, date: NaiveDate) -> Result<usize, AssignmentServiceError> {
        let previous = date
            .pred_opt()
            .ok_or(AssignmentServiceError::NoPreviousDay(date))?;
        let copied = self.repo.copy_day(previous, date)?;
        info!(
            "event=assignment_copy_day module=service status=ok from={} to={} copied={}",
            previous, date, copied
        );
        Ok(copied)
    }

    /// Removes every assignment on `date`, cascading to completions.
    pub fn clear_day(&self, date: NaiveDate) -> Result<usize, AssignmentServiceError> {
        let removed = self.repo.clear_day(date)?;
        info!(
            "event=assignment_clear_day module=service status=ok date={} removed={}",
            date, removed
        );
        Ok(removed)
    }
}
