//! Recurring assignment generator.
//!
//! # Responsibility
//! - Turn recurring chores into assignments for one target date.
//! - Stay storage-agnostic behind `RecurrenceStore`; SQLite callers use
//!   `generate_recurring_assignments`, which wraps one run in a transaction.
//!
//! # Invariants
//! - Idempotent: a second run for the same date creates nothing.
//! - Generated assignments use `due_date == assigned_date == target_date`.
//! - A failed run commits nothing.
//! - A chore row with unusable stored settings is skipped and counted; it
//!   never aborts the run.
//! - The strategy is only consulted for chores still missing an assignment,
//!   so re-running a date leaves stateful strategies where they were.

use super::calendar::{chore_is_due, weekday_code};
use super::strategy::{AssigneePool, AssignmentStrategy};
use super::ScheduleError;
use crate::model::assignment::{AssignmentId, NewAssignment};
use crate::model::chore::{Chore, ChoreId};
use crate::model::person::PersonId;
use crate::model::recurrence::RecurrenceKind;
use crate::repo::recurrence_store::SqliteRecurrenceStore;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::time::Instant;

/// A chore row that could not be turned into a usable chore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidChoreRow {
    pub chore_id: ChoreId,
    pub reason: String,
}

/// Recurring chores as loaded by a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurringChores {
    pub chores: Vec<Chore>,
    pub invalid: Vec<InvalidChoreRow>,
}

/// Data access the generator needs.
pub trait RecurrenceStore {
    /// Chores with the recurrence flag set, optionally narrowed to one kind.
    fn recurring_chores(&self, kind: Option<RecurrenceKind>) -> RepoResult<RecurringChores>;
    /// All people with their latest assigned date.
    fn assignee_pool(&self) -> RepoResult<AssigneePool>;
    /// Whether the chore already has an assignment on `date`.
    fn has_assignment(&self, chore_id: ChoreId, date: NaiveDate) -> RepoResult<bool>;
    /// Inserts unless (chore, assigned date) exists; `None` on conflict.
    fn insert_assignment_if_absent(
        &self,
        assignment: &NewAssignment,
    ) -> RepoResult<Option<AssignmentId>>;
}

impl<T: RecurrenceStore + ?Sized> RecurrenceStore for &T {
    fn recurring_chores(&self, kind: Option<RecurrenceKind>) -> RepoResult<RecurringChores> {
        (**self).recurring_chores(kind)
    }

    fn assignee_pool(&self) -> RepoResult<AssigneePool> {
        (**self).assignee_pool()
    }

    fn has_assignment(&self, chore_id: ChoreId, date: NaiveDate) -> RepoResult<bool> {
        (**self).has_assignment(chore_id, date)
    }

    fn insert_assignment_if_absent(
        &self,
        assignment: &NewAssignment,
    ) -> RepoResult<Option<AssignmentId>> {
        (**self).insert_assignment_if_absent(assignment)
    }
}

/// One assignment created by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GeneratedAssignment {
    pub assignment_id: AssignmentId,
    pub chore_id: ChoreId,
    pub person_id: PersonId,
}

/// Outcome of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub target_date: NaiveDate,
    /// Recurring chores whose rule includes the date.
    pub due_chores: usize,
    /// Assignments actually inserted.
    pub created: usize,
    /// Due chores that already had an assignment for the date.
    pub already_assigned: usize,
    /// Due chores skipped because nobody could be assigned.
    pub skipped_without_assignee: usize,
    /// Recurring chore rows skipped because their stored settings are unusable.
    pub skipped_invalid: usize,
    pub assignments: Vec<GeneratedAssignment>,
}

impl GenerationReport {
    fn empty(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            due_chores: 0,
            created: 0,
            already_assigned: 0,
            skipped_without_assignee: 0,
            skipped_invalid: 0,
            assignments: Vec::new(),
        }
    }
}

/// Storage-agnostic generator over a store and an assignee strategy.
pub struct RecurringAssignmentGenerator<S: RecurrenceStore, A: AssignmentStrategy> {
    store: S,
    strategy: A,
}

impl<S: RecurrenceStore, A: AssignmentStrategy> RecurringAssignmentGenerator<S, A> {
    pub fn new(store: S, strategy: A) -> Self {
        Self { store, strategy }
    }

    /// Creates the missing assignments for `target_date`.
    ///
    /// # Errors
    /// - `ScheduleError::StoreUnavailable` when any store call fails.
    pub fn generate(&mut self, target_date: NaiveDate) -> Result<GenerationReport, ScheduleError> {
        let started_at = Instant::now();
        let weekday = weekday_code(target_date);
        let mut report = GenerationReport::empty(target_date);

        let RecurringChores { chores, invalid } = self.store.recurring_chores(None)?;
        for row in &invalid {
            warn!(
                "event=generate_recurring module=schedule status=skip date={} chore_id={} reason=invalid_chore_row",
                target_date, row.chore_id
            );
            debug!(
                "event=generate_recurring module=schedule chore_id={} invalid_row={:?}",
                row.chore_id, row.reason
            );
        }
        report.skipped_invalid = invalid.len();

        let due: Vec<&Chore> = chores
            .iter()
            .filter(|chore| chore_is_due(chore, target_date))
            .collect();
        report.due_chores = due.len();

        if due.is_empty() {
            info!(
                "event=generate_recurring module=schedule status=ok date={} weekday={} recurring={} invalid={} due=0 created=0 duration_ms={}",
                target_date,
                weekday,
                chores.len(),
                report.skipped_invalid,
                started_at.elapsed().as_millis()
            );
            return Ok(report);
        }

        let mut pool = self.store.assignee_pool()?;
        for chore in due {
            if self.store.has_assignment(chore.id, target_date)? {
                report.already_assigned += 1;
                continue;
            }

            let person_id = match self.strategy.select(chore, &pool) {
                Ok(person_id) => person_id,
                Err(ScheduleError::EmptyPersonPool) => {
                    warn!(
                        "event=generate_recurring module=schedule status=skip date={} chore_id={} reason=empty_person_pool",
                        target_date, chore.id
                    );
                    report.skipped_without_assignee += 1;
                    continue;
                }
                Err(err) => return Err(err),
            };

            let assignment = NewAssignment::same_day(chore.id, person_id, target_date);
            match self.store.insert_assignment_if_absent(&assignment)? {
                Some(assignment_id) => {
                    debug!(
                        "event=generate_recurring module=schedule status=created date={} chore_id={} person_id={} assignment_id={}",
                        target_date, chore.id, person_id, assignment_id
                    );
                    pool.record_assignment(person_id, target_date);
                    report.created += 1;
                    report.assignments.push(GeneratedAssignment {
                        assignment_id,
                        chore_id: chore.id,
                        person_id,
                    });
                }
                None => report.already_assigned += 1,
            }
        }

        info!(
            "event=generate_recurring module=schedule status=ok date={} weekday={} strategy={} recurring={} invalid={} due={} created={} existing={} skipped={} duration_ms={}",
            target_date,
            weekday,
            self.strategy.name(),
            chores.len(),
            report.skipped_invalid,
            report.due_chores,
            report.created,
            report.already_assigned,
            report.skipped_without_assignee,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }
}

/// Runs one generation against SQLite inside an IMMEDIATE transaction.
///
/// Concurrent runs for the same date serialize on the write lock; the
/// (chore, date) unique index keeps them from duplicating rows either way.
///
/// # Errors
/// - `ScheduleError::StoreUnavailable`; the transaction is rolled back.
pub fn generate_recurring_assignments<A: AssignmentStrategy>(
    conn: &mut Connection,
    strategy: A,
    target_date: NaiveDate,
) -> Result<GenerationReport, ScheduleError> {
    let result = run_in_transaction(conn, strategy, target_date);
    if let Err(err) = &result {
        error!(
            "event=generate_recurring module=schedule status=error date={} error={}",
            target_date, err
        );
    }
    result
}

fn run_in_transaction<A: AssignmentStrategy>(
    conn: &mut Connection,
    strategy: A,
    target_date: NaiveDate,
) -> Result<GenerationReport, ScheduleError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let report = {
        let store = SqliteRecurrenceStore::new(&tx);
        let mut generator = RecurringAssignmentGenerator::new(store, strategy);
        generator.generate(target_date)?
    };
    tx.commit()?;
    Ok(report)
}
