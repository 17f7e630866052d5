//! Assignment repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist assignments with conflict-aware insert semantics.
//! - Provide the per-day board read model (assignment + chore + assignee +
//!   completion + review).
//! - Own bulk day operations (copy from another day, clear a day).
//!
//! # Invariants
//! - (`chore_id`, `assigned_date`) is unique; `insert_if_absent` treats a
//!   conflict on that pair as a no-op and never updates the existing row.
//! - Bulk day operations run in a single transaction.

use super::chore_repo::chore_exists;
use super::person_repo::person_exists;
use super::{int_to_bool, int_to_minutes, RepoError, RepoResult};
use crate::model::assignment::{Assignment, AssignmentId, NewAssignment};
use crate::model::chore::ChoreId;
use crate::model::person::PersonId;
use crate::model::review::{CompletionId, ReviewId};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

const ASSIGNMENT_SELECT_SQL: &str = "SELECT
    id,
    chore_id,
    person_id,
    assigned_date,
    due_date,
    notes
FROM assignments";

/// Progress of one board row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardStatus {
    Pending,
    Completed,
    Approved,
    Rejected,
}

impl BoardStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// Read model for one assignment on the daily board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayBoardEntry {
    pub assignment_id: AssignmentId,
    pub assigned_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub chore_id: ChoreId,
    pub room: String,
    pub task: String,
    pub estimated_minutes: u32,
    pub person_id: PersonId,
    pub assignee: String,
    pub completion_id: Option<CompletionId>,
    pub completed_at: Option<NaiveDateTime>,
    pub actual_minutes: Option<u32>,
    pub completion_notes: Option<String>,
    pub photo_filename: Option<String>,
    pub review_id: Option<ReviewId>,
    pub approved: Option<bool>,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
}

impl DayBoardEntry {
    pub fn status(&self) -> BoardStatus {
        match (self.completion_id, self.approved) {
            (None, _) => BoardStatus::Pending,
            (Some(_), None) => BoardStatus::Completed,
            (Some(_), Some(true)) => BoardStatus::Approved,
            (Some(_), Some(false)) => BoardStatus::Rejected,
        }
    }
}

/// Repository interface for assignment persistence.
pub trait AssignmentRepository {
    /// Inserts unless (`chore_id`, `assigned_date`) already exists.
    ///
    /// Returns `None` when the pair was already taken.
    fn insert_if_absent(&self, assignment: &NewAssignment) -> RepoResult<Option<AssignmentId>>;
    /// Inserts or re-points the existing (`chore_id`, `assigned_date`) row to
    /// the new person and due date.
    ///
    /// Returns `NotFound` when the chore or person does not exist.
    fn upsert_assignment(&self, assignment: &NewAssignment) -> RepoResult<AssignmentId>;
    fn get_assignment(&self, id: AssignmentId) -> RepoResult<Option<Assignment>>;
    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<Assignment>>;
    /// Board rows ordered by due date, room, task.
    fn day_board(&self, date: NaiveDate) -> RepoResult<Vec<DayBoardEntry>>;
    /// Replaces `to` assignments with copies of `from` assignments.
    fn copy_day(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<usize>;
    fn clear_day(&self, date: NaiveDate) -> RepoResult<usize>;
}

/// SQLite-backed assignment repository.
pub struct SqliteAssignmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssignmentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AssignmentRepository for SqliteAssignmentRepository<'_> {
    fn insert_if_absent(&self, assignment: &NewAssignment) -> RepoResult<Option<AssignmentId>> {
        insert_assignment_if_absent(self.conn, assignment)
    }

    fn upsert_assignment(&self, assignment: &NewAssignment) -> RepoResult<AssignmentId> {
        if !chore_exists(self.conn, assignment.chore_id)? {
            return Err(RepoError::NotFound {
                entity: "chore",
                id: assignment.chore_id,
            });
        }
        if !person_exists(self.conn, assignment.person_id)? {
            return Err(RepoError::NotFound {
                entity: "person",
                id: assignment.person_id,
            });
        }

        let id = self.conn.query_row(
            "INSERT INTO assignments (chore_id, person_id, assigned_date, due_date, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(chore_id, assigned_date) DO UPDATE SET
                person_id = excluded.person_id,
                due_date = excluded.due_date,
                notes = COALESCE(excluded.notes, assignments.notes)
             RETURNING id;",
            params![
                assignment.chore_id,
                assignment.person_id,
                assignment.assigned_date,
                assignment.due_date,
                assignment.notes.as_deref(),
            ],
            |row| row.get::<_, AssignmentId>(0),
        )?;
        Ok(id)
    }

    fn get_assignment(&self, id: AssignmentId) -> RepoResult<Option<Assignment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ASSIGNMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_assignment_row(row)?));
        }
        Ok(None)
    }

    fn list_for_date(&self, date: NaiveDate) -> RepoResult<Vec<Assignment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSIGNMENT_SELECT_SQL} WHERE assigned_date = ?1 ORDER BY chore_id ASC;"
        ))?;
        let mut rows = stmt.query([date])?;
        let mut assignments = Vec::new();
        while let Some(row) = rows.next()? {
            assignments.push(parse_assignment_row(row)?);
        }
        Ok(assignments)
    }

    fn day_board(&self, date: NaiveDate) -> RepoResult<Vec<DayBoardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id AS assignment_id,
                a.assigned_date,
                a.due_date,
                c.id AS chore_id,
                c.room,
                c.task,
                c.estimated_time,
                p.id AS person_id,
                p.name AS assignee,
                comp.id AS completion_id,
                comp.completed_datetime,
                comp.actual_minutes,
                comp.notes AS completion_notes,
                comp.photo_filename,
                pr.id AS review_id,
                pr.approved,
                reviewer.name AS reviewed_by,
                pr.review_notes
             FROM assignments a
             JOIN chores c ON c.id = a.chore_id
             JOIN people p ON p.id = a.person_id
             LEFT JOIN completions comp ON comp.assignment_id = a.id
             LEFT JOIN parental_reviews pr ON pr.completion_id = comp.id
             LEFT JOIN people reviewer ON reviewer.id = pr.reviewed_by_person_id
             WHERE a.assigned_date = ?1
             ORDER BY a.due_date ASC, c.room ASC, c.task ASC, a.id ASC;",
        )?;

        let mut rows = stmt.query([date])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_board_row(row)?);
        }
        Ok(entries)
    }

    fn copy_day(&self, from: NaiveDate, to: NaiveDate) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM assignments WHERE assigned_date = ?1;", [to])?;
        let copied = tx.execute(
            "INSERT INTO assignments (chore_id, person_id, assigned_date, due_date)
             SELECT chore_id, person_id, ?1, ?1
             FROM assignments
             WHERE assigned_date = ?2;",
            params![to, from],
        )?;
        tx.commit()?;
        Ok(copied)
    }

    fn clear_day(&self, date: NaiveDate) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM assignments WHERE assigned_date = ?1;", [date])?;
        Ok(removed)
    }
}

/// Whether `chore_id` already has an assignment on `assigned_date`.
pub(crate) fn assignment_exists_on(
    conn: &Connection,
    chore_id: ChoreId,
    assigned_date: NaiveDate,
) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM assignments WHERE chore_id = ?1 AND assigned_date = ?2;",
            params![chore_id, assigned_date],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Conflict-tolerant insert shared with the recurrence store.
pub(crate) fn insert_assignment_if_absent(
    conn: &Connection,
    assignment: &NewAssignment,
) -> RepoResult<Option<AssignmentId>> {
    let changed = conn.execute(
        "INSERT INTO assignments (chore_id, person_id, assigned_date, due_date, notes)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(chore_id, assigned_date) DO NOTHING;",
        params![
            assignment.chore_id,
            assignment.person_id,
            assignment.assigned_date,
            assignment.due_date,
            assignment.notes.as_deref(),
        ],
    )?;

    if changed == 0 {
        return Ok(None);
    }
    Ok(Some(conn.last_insert_rowid()))
}

fn parse_assignment_row(row: &Row<'_>) -> RepoResult<Assignment> {
    Ok(Assignment {
        id: row.get("id")?,
        chore_id: row.get("chore_id")?,
        person_id: row.get("person_id")?,
        assigned_date: row.get("assigned_date")?,
        due_date: row.get("due_date")?,
        notes: row.get("notes")?,
    })
}

fn parse_board_row(row: &Row<'_>) -> RepoResult<DayBoardEntry> {
    let actual_minutes = match row.get::<_, Option<i64>>("actual_minutes")? {
        Some(value) => Some(int_to_minutes(value, "completions.actual_minutes")?),
        None => None,
    };
    let approved = match row.get::<_, Option<i64>>("approved")? {
        Some(value) => Some(int_to_bool(value, "parental_reviews.approved")?),
        None => None,
    };

    Ok(DayBoardEntry {
        assignment_id: row.get("assignment_id")?,
        assigned_date: row.get("assigned_date")?,
        due_date: row.get("due_date")?,
        chore_id: row.get("chore_id")?,
        room: row.get("room")?,
        task: row.get("task")?,
        estimated_minutes: int_to_minutes(row.get("estimated_time")?, "chores.estimated_time")?,
        person_id: row.get("person_id")?,
        assignee: row.get("assignee")?,
        completion_id: row.get("completion_id")?,
        completed_at: row.get("completed_datetime")?,
        actual_minutes,
        completion_notes: row.get("completion_notes")?,
        photo_filename: row.get("photo_filename")?,
        review_id: row.get("review_id")?,
        approved,
        reviewed_by: row.get("reviewed_by")?,
        review_notes: row.get("review_notes")?,
    })
}
