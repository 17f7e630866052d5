//! Completion and parental review persistence.
//!
//! # Responsibility
//! - Record completions and reviews.
//! - Provide the review queue read model over a date range.
//!
//! # Invariants
//! - `completions.assignment_id` and `parental_reviews.completion_id` are
//!   unique; callers check existence first to report semantic errors.
//! - Queue order is newest completion first.

use super::{bool_to_int, int_to_bool, int_to_minutes, RepoResult};
use crate::model::assignment::AssignmentId;
use crate::model::review::{
    Completion, CompletionId, NewCompletion, NewReview, ParentalReview, ReviewId,
};
use crate::model::DateRange;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

const COMPLETION_SELECT_SQL: &str = "SELECT
    id,
    assignment_id,
    completed_datetime,
    actual_minutes,
    notes,
    photo_filename
FROM completions";

const REVIEW_SELECT_SQL: &str = "SELECT
    id,
    completion_id,
    reviewed_by_person_id,
    approved,
    review_notes,
    reviewed_datetime
FROM parental_reviews";

/// Read model for one completion awaiting (or past) review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewQueueEntry {
    pub completion_id: CompletionId,
    pub assigned_date: NaiveDate,
    pub room: String,
    pub task: String,
    pub completed_by: String,
    pub completed_at: NaiveDateTime,
    pub actual_minutes: u32,
    pub notes: Option<String>,
    pub photo_filename: Option<String>,
    pub review_id: Option<ReviewId>,
    pub approved: Option<bool>,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
}

/// Repository interface for completions and reviews.
pub trait ReviewRepository {
    fn assignment_exists(&self, id: AssignmentId) -> RepoResult<bool>;
    fn create_completion(&self, completion: &NewCompletion) -> RepoResult<CompletionId>;
    fn get_completion(&self, id: CompletionId) -> RepoResult<Option<Completion>>;
    fn completion_for_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> RepoResult<Option<Completion>>;
    fn create_review(&self, review: &NewReview) -> RepoResult<ReviewId>;
    fn review_for_completion(
        &self,
        completion_id: CompletionId,
    ) -> RepoResult<Option<ParentalReview>>;
    fn review_queue(
        &self,
        range: &DateRange,
        include_reviewed: bool,
    ) -> RepoResult<Vec<ReviewQueueEntry>>;
}

/// SQLite-backed completion/review repository.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReviewRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn completion_where(&self, column: &str, value: i64) -> RepoResult<Option<Completion>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPLETION_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_completion_row(row)?));
        }
        Ok(None)
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn assignment_exists(&self, id: AssignmentId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM assignments WHERE id = ?1;", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn create_completion(&self, completion: &NewCompletion) -> RepoResult<CompletionId> {
        self.conn.execute(
            "INSERT INTO completions (assignment_id, actual_minutes, notes, photo_filename)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                completion.assignment_id,
                i64::from(completion.actual_minutes),
                completion.notes.as_deref(),
                completion.photo_filename.as_deref(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_completion(&self, id: CompletionId) -> RepoResult<Option<Completion>> {
        self.completion_where("id", id)
    }

    fn completion_for_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> RepoResult<Option<Completion>> {
        self.completion_where("assignment_id", assignment_id)
    }

    fn create_review(&self, review: &NewReview) -> RepoResult<ReviewId> {
        self.conn.execute(
            "INSERT INTO parental_reviews (
                completion_id,
                reviewed_by_person_id,
                approved,
                review_notes
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                review.completion_id,
                review.reviewer_id,
                bool_to_int(review.approved),
                review.review_notes.as_deref(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn review_for_completion(
        &self,
        completion_id: CompletionId,
    ) -> RepoResult<Option<ParentalReview>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVIEW_SELECT_SQL} WHERE completion_id = ?1;"))?;
        let mut rows = stmt.query([completion_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(ParentalReview {
                id: row.get("id")?,
                completion_id: row.get("completion_id")?,
                reviewer_id: row.get("reviewed_by_person_id")?,
                approved: int_to_bool(row.get("approved")?, "parental_reviews.approved")?,
                review_notes: row.get("review_notes")?,
                reviewed_at: row.get("reviewed_datetime")?,
            }));
        }
        Ok(None)
    }

    fn review_queue(
        &self,
        range: &DateRange,
        include_reviewed: bool,
    ) -> RepoResult<Vec<ReviewQueueEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                comp.id AS completion_id,
                a.assigned_date,
                c.room,
                c.task,
                p.name AS completed_by,
                comp.completed_datetime,
                comp.actual_minutes,
                comp.notes,
                comp.photo_filename,
                pr.id AS review_id,
                pr.approved,
                reviewer.name AS reviewed_by,
                pr.review_notes
             FROM completions comp
             JOIN assignments a ON a.id = comp.assignment_id
             JOIN chores c ON c.id = a.chore_id
             JOIN people p ON p.id = a.person_id
             LEFT JOIN parental_reviews pr ON pr.completion_id = comp.id
             LEFT JOIN people reviewer ON reviewer.id = pr.reviewed_by_person_id
             WHERE a.assigned_date BETWEEN ?1 AND ?2
               AND (?3 = 1 OR pr.id IS NULL)
             ORDER BY comp.completed_datetime DESC, comp.id DESC;",
        )?;

        let mut rows = stmt.query(params![
            range.start(),
            range.end(),
            bool_to_int(include_reviewed)
        ])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_queue_row(row)?);
        }
        Ok(entries)
    }
}

fn parse_completion_row(row: &Row<'_>) -> RepoResult<Completion> {
    Ok(Completion {
        id: row.get("id")?,
        assignment_id: row.get("assignment_id")?,
        completed_at: row.get("completed_datetime")?,
        actual_minutes: int_to_minutes(row.get("actual_minutes")?, "completions.actual_minutes")?,
        notes: row.get("notes")?,
        photo_filename: row.get("photo_filename")?,
    })
}

fn parse_queue_row(row: &Row<'_>) -> RepoResult<ReviewQueueEntry> {
    let approved = match row.get::<_, Option<i64>>("approved")? {
        Some(value) => Some(int_to_bool(value, "parental_reviews.approved")?),
        None => None,
    };

    Ok(ReviewQueueEntry {
        completion_id: row.get("completion_id")?,
        assigned_date: row.get("assigned_date")?,
        room: row.get("room")?,
        task: row.get("task")?,
        completed_by: row.get("completed_by")?,
        completed_at: row.get("completed_datetime")?,
        actual_minutes: int_to_minutes(row.get("actual_minutes")?, "completions.actual_minutes")?,
        notes: row.get("notes")?,
        photo_filename: row.get("photo_filename")?,
        review_id: row.get("review_id")?,
        approved,
        reviewed_by: row.get("reviewed_by")?,
        review_notes: row.get("review_notes")?,
    })
}
