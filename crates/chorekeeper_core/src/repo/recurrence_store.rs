//! SQLite implementation of the generator's `RecurrenceStore`.
//!
//! # Invariants
//! - The assignee pool holds every person, regardless of role.
//! - Chore rows with unusable stored settings are returned as invalid, not
//!   as an error.
//! - The existence check is advisory; the (chore, assigned date) unique
//!   index still decides conflicts at insert time.

use super::assignment_repo::{assignment_exists_on, insert_assignment_if_absent};
use super::chore_repo::load_recurring_chores;
use super::RepoResult;
use crate::model::assignment::{AssignmentId, NewAssignment};
use crate::model::chore::ChoreId;
use crate::model::recurrence::RecurrenceKind;
use crate::schedule::{Assignee, AssigneePool, RecurrenceStore, RecurringChores};
use chrono::NaiveDate;
use rusqlite::Connection;

/// Generator store over one SQLite connection or transaction.
pub struct SqliteRecurrenceStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecurrenceStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecurrenceStore for SqliteRecurrenceStore<'_> {
    fn recurring_chores(&self, kind: Option<RecurrenceKind>) -> RepoResult<RecurringChores> {
        load_recurring_chores(self.conn, kind)
    }

    fn assignee_pool(&self) -> RepoResult<AssigneePool> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id AS person_id, MAX(a.assigned_date) AS last_assigned
             FROM people p
             LEFT JOIN assignments a ON a.person_id = p.id
             GROUP BY p.id
             ORDER BY p.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(Assignee {
                person_id: row.get("person_id")?,
                last_assigned: row.get("last_assigned")?,
            });
        }
        Ok(AssigneePool::new(members))
    }

    fn has_assignment(&self, chore_id: ChoreId, date: NaiveDate) -> RepoResult<bool> {
        assignment_exists_on(self.conn, chore_id, date)
    }

    fn insert_assignment_if_absent(
        &self,
        assignment: &NewAssignment,
    ) -> RepoResult<Option<AssignmentId>> {
        insert_assignment_if_absent(self.conn, assignment)
    }
}
