//! Pure date predicates for recurrence inclusion.
//!
//! Everything here is side-effect free and independent of storage.

use super::ScheduleError;
use crate::model::chore::Chore;
use crate::model::recurrence::{Recurrence, WeekdayCode};
use chrono::{Datelike, NaiveDate};

/// Accepted input format for target dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The single weekday on which `weekly` chores are scheduled.
pub const WEEKLY_DAY: WeekdayCode = WeekdayCode::Monday;

/// Parses a `YYYY-MM-DD` target date.
///
/// # Errors
/// - `ScheduleError::InvalidDate` for malformed or impossible dates
///   (e.g. `2023-02-29`).
pub fn parse_target_date(input: &str) -> Result<NaiveDate, ScheduleError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|err| ScheduleError::InvalidDate {
        input: trimmed.to_string(),
        reason: err.to_string(),
    })
}

/// Weekday code of `date` (`SU` for Sunday, `M` for Monday, ...).
pub fn weekday_code(date: NaiveDate) -> WeekdayCode {
    WeekdayCode::from_weekday(date.weekday())
}

/// Whether a recurrence rule includes `date`.
pub fn is_due_on(recurrence: &Recurrence, date: NaiveDate) -> bool {
    let code = weekday_code(date);
    match recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekly => code == WEEKLY_DAY,
        Recurrence::Weekdays => !matches!(code, WeekdayCode::Saturday | WeekdayCode::Sunday),
        Recurrence::SpecificDays(days) => days.contains(code),
        // No generation rule exists for monthly chores.
        Recurrence::Monthly => false,
    }
}

/// Whether a chore should receive a generated assignment on `date`.
///
/// Non-recurring chores are never due.
pub fn chore_is_due(chore: &Chore, date: NaiveDate) -> bool {
    chore
        .recurrence
        .as_ref()
        .is_some_and(|recurrence| is_due_on(recurrence, date))
}
