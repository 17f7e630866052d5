//! Chore administration use-case service.
//!
//! # Responsibility
//! - Create chores and edit their recurrence settings.
//! - Parse recurrence input in the (`enabled`, `kind`, `days`) shape the
//!   admin surface collects.
//!
//! # Invariants
//! - Recurrence edits never touch existing assignments.
//! - Disabling recurrence clears kind and days together.

use crate::model::chore::{Chore, ChoreId, NewChore};
use crate::model::recurrence::{Recurrence, RecurrenceKind, RecurrenceParseError};
use crate::model::ValidationError;
use crate::repo::chore_repo::ChoreRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for chore use-cases.
#[derive(Debug)]
pub enum ChoreServiceError {
    /// Field-level validation failed.
    Invalid(ValidationError),
    /// Recurrence kind or weekday list could not be parsed.
    InvalidRecurrence(RecurrenceParseError),
    ChoreNotFound(ChoreId),
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ChoreServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::InvalidRecurrence(err) => write!(f, "{err}"),
            Self::ChoreNotFound(id) => write!(f, "chore not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent chore state: {details}"),
        }
    }
}

impl Error for ChoreServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::InvalidRecurrence(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ChoreServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "chore",
                id,
            } => Self::ChoreNotFound(id),
            RepoError::Validation(err) => Self::Invalid(err),
            other => Self::Repo(other),
        }
    }
}

impl From<RecurrenceParseError> for ChoreServiceError {
    fn from(value: RecurrenceParseError) -> Self {
        Self::InvalidRecurrence(value)
    }
}

/// Builds a recurrence rule from raw admin input.
///
/// `enabled == false` yields `None` regardless of the other inputs.
///
/// # Errors
/// - `UnknownKind` when enabled without a recognizable kind.
/// - Any `Recurrence::from_parts` error for the weekday list.
pub fn parse_recurrence_input(
    enabled: bool,
    kind: Option<&str>,
    days: Option<&str>,
) -> Result<Option<Recurrence>, RecurrenceParseError> {
    if !enabled {
        return Ok(None);
    }

    let kind_text = kind.unwrap_or_default();
    let kind = RecurrenceKind::parse(kind_text)
        .ok_or_else(|| RecurrenceParseError::UnknownKind(kind_text.trim().to_string()))?;
    // Only specific_days consumes the weekday list; other kinds drop it.
    let days = match kind {
        RecurrenceKind::SpecificDays => days,
        _ => None,
    };
    Recurrence::from_parts(kind, days).map(Some)
}

/// Chore service facade over repository implementations.
pub struct ChoreService<R: ChoreRepository> {
    repo: R,
}

impl<R: ChoreRepository> ChoreService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one chore and returns the stored record.
    pub fn create_chore(&self, chore: &NewChore) -> Result<Chore, ChoreServiceError> {
        let id = self.repo.create_chore(chore)?;
        info!(
            "event=chore_create module=service status=ok chore_id={} recurring={}",
            id,
            chore.recurrence.is_some()
        );
        self.repo
            .get_chore(id)?
            .ok_or(ChoreServiceError::InconsistentState(
                "created chore not found in read-back",
            ))
    }

    pub fn get_chore(&self, id: ChoreId) -> Result<Chore, ChoreServiceError> {
        self.repo
            .get_chore(id)?
            .ok_or(ChoreServiceError::ChoreNotFound(id))
    }

    /// Lists all chores ordered by room, task.
    pub fn list_chores(&self) -> Result<Vec<Chore>, ChoreServiceError> {
        Ok(self.repo.list_chores()?)
    }

    pub fn list_recurring_chores(
        &self,
        kind: Option<RecurrenceKind>,
    ) -> Result<Vec<Chore>, ChoreServiceError> {
        Ok(self.repo.list_recurring_chores(kind)?)
    }

    /// Replaces the recurrence rule and returns the updated chore.
    pub fn set_recurrence(
        &self,
        id: ChoreId,
        recurrence: Option<Recurrence>,
    ) -> Result<Chore, ChoreServiceError> {
        self.repo.set_recurrence(id, recurrence.as_ref())?;
        info!(
            "event=chore_recurrence_update module=service status=ok chore_id={} kind={}",
            id,
            recurrence
                .as_ref()
                .map_or("none", |rule| rule.kind().as_str())
        );
        self.get_chore(id)
    }

    /// Parses raw admin input, then replaces the recurrence rule.
    pub fn update_recurrence_settings(
        &self,
        id: ChoreId,
        enabled: bool,
        kind: Option<&str>,
        days: Option<&str>,
    ) -> Result<Chore, ChoreServiceError> {
        let recurrence = parse_recurrence_input(enabled, kind, days)?;
        self.set_recurrence(id, recurrence)
    }
}
