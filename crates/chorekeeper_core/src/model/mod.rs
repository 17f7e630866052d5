//! Household chore domain model.
//!
//! # Responsibility
//! - Define canonical records for chores, people, assignments, completions
//!   and parental reviews.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - A chore is recurring iff it carries a `Recurrence`.
//! - `Recurrence::SpecificDays` always holds a non-empty weekday set once
//!   validated.
//! - Identifiers are SQLite row ids and never reused.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod assignment;
pub mod chore;
pub mod person;
pub mod recurrence;
pub mod review;

/// Field-level validation failure for model write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank after trim.
    BlankField(&'static str),
    /// Estimated duration must be at least one minute.
    NonPositiveEstimate,
    /// `specific_days` recurrence without any weekday.
    EmptyRecurrenceDays,
    /// Range start falls after range end.
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::NonPositiveEstimate => write!(f, "estimated minutes must be positive"),
            Self::EmptyRecurrenceDays => {
                write!(f, "specific_days recurrence requires at least one weekday")
            }
            Self::InvertedDateRange { start, end } => {
                write!(f, "date range start {start} is after end {end}")
            }
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

/// Inclusive calendar date range used by review and report queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// The `days`-long window ending on `end` (inclusive).
    ///
    /// `days == 0` is treated as a single day.
    pub fn ending_on(end: NaiveDate, days: u32) -> Self {
        let span = u64::from(days.saturating_sub(1));
        let start = end.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
