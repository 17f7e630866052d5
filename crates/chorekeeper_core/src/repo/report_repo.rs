//! Read-side completion reports.
//!
//! # Responsibility
//! - Query the `daily_completion_summary` and `individual_completion_summary`
//!   views for a date range.
//!
//! # Invariants
//! - Reports never write; they are pure projections of assignments and
//!   completions.
//! - Rows are ordered by date ascending; days without assignments are absent.

use super::{int_to_minutes, RepoError, RepoResult};
use crate::model::person::PersonId;
use crate::model::DateRange;
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::Serialize;

/// One day of household-wide completion stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_assigned: u32,
    pub total_completed: u32,
    /// Percentage with one decimal place.
    pub completion_rate: f64,
}

/// One day of completion stats for a single person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndividualSummary {
    pub date: NaiveDate,
    pub person_id: PersonId,
    pub person_name: String,
    pub assigned: u32,
    pub completed: u32,
    pub completion_rate: f64,
    pub estimated_minutes: u32,
    pub actual_minutes: u32,
}

/// Aggregated totals across a summary range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryTotals {
    pub assigned: u32,
    pub completed: u32,
    pub completion_rate: f64,
}

/// Household-wide per-day completion summary.
pub fn family_summary(conn: &Connection, range: &DateRange) -> RepoResult<Vec<DailySummary>> {
    let mut stmt = conn.prepare(
        "SELECT summary_date, total_assigned, total_completed, completion_rate
         FROM daily_completion_summary
         WHERE summary_date BETWEEN ?1 AND ?2
         ORDER BY summary_date ASC;",
    )?;
    let mut rows = stmt.query(params![range.start(), range.end()])?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next()? {
        summaries.push(DailySummary {
            date: row.get("summary_date")?,
            total_assigned: count(row, "total_assigned")?,
            total_completed: count(row, "total_completed")?,
            completion_rate: row.get("completion_rate")?,
        });
    }
    Ok(summaries)
}

/// Per-day completion summary for one person.
pub fn individual_summary(
    conn: &Connection,
    person_id: PersonId,
    range: &DateRange,
) -> RepoResult<Vec<IndividualSummary>> {
    let mut stmt = conn.prepare(
        "SELECT
            summary_date,
            person_id,
            person_name,
            assigned,
            completed,
            completion_rate,
            estimated_minutes,
            actual_minutes
         FROM individual_completion_summary
         WHERE person_id = ?1
           AND summary_date BETWEEN ?2 AND ?3
         ORDER BY summary_date ASC;",
    )?;
    let mut rows = stmt.query(params![person_id, range.start(), range.end()])?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next()? {
        summaries.push(IndividualSummary {
            date: row.get("summary_date")?,
            person_id: row.get("person_id")?,
            person_name: row.get("person_name")?,
            assigned: count(row, "assigned")?,
            completed: count(row, "completed")?,
            completion_rate: row.get("completion_rate")?,
            estimated_minutes: int_to_minutes(
                row.get("estimated_minutes")?,
                "individual_completion_summary.estimated_minutes",
            )?,
            actual_minutes: int_to_minutes(
                row.get("actual_minutes")?,
                "individual_completion_summary.actual_minutes",
            )?,
        });
    }
    Ok(summaries)
}

/// Sums per-day rows into range totals; the rate is recomputed, not averaged.
pub fn totals(days: impl IntoIterator<Item = (u32, u32)>) -> SummaryTotals {
    let (assigned, completed) = days
        .into_iter()
        .fold((0u32, 0u32), |(a, c), (day_a, day_c)| (a + day_a, c + day_c));
    let completion_rate = if assigned == 0 {
        0.0
    } else {
        (f64::from(completed) * 1000.0 / f64::from(assigned)).round() / 10.0
    };
    SummaryTotals {
        assigned,
        completed,
        completion_rate,
    }
}

fn count(row: &Row<'_>, column: &str) -> RepoResult<u32> {
    let value: i64 = row.get(column)?;
    u32::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid count `{value}` in {column}")))
}
