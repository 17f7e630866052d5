//! Chore repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `chores` table.
//! - Map the typed `Recurrence` rule to the persisted
//!   (`is_recurring`, `recurrence_type`, `recurrence_days`) columns.
//!
//! # Invariants
//! - `recurrence_type` is non-null iff `is_recurring = 1`.
//! - `recurrence_days` is non-empty iff `recurrence_type = 'specific_days'`.
//! - Listing order is `room, task, id`.

use super::{bool_to_int, int_to_bool, int_to_minutes, RepoError, RepoResult};
use crate::model::chore::{validate_recurrence, Chore, ChoreId, NewChore};
use crate::model::recurrence::{Recurrence, RecurrenceKind};
use crate::schedule::{InvalidChoreRow, RecurringChores};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CHORE_SELECT_SQL: &str = "SELECT
    id,
    room,
    task,
    frequency,
    estimated_time,
    is_recurring,
    recurrence_type,
    recurrence_days
FROM chores";

/// Repository interface for chore master data.
pub trait ChoreRepository {
    fn create_chore(&self, chore: &NewChore) -> RepoResult<ChoreId>;
    fn get_chore(&self, id: ChoreId) -> RepoResult<Option<Chore>>;
    fn list_chores(&self) -> RepoResult<Vec<Chore>>;
    /// Lists chores with the recurrence flag set, optionally narrowed to one kind.
    fn list_recurring_chores(&self, kind: Option<RecurrenceKind>) -> RepoResult<Vec<Chore>>;
    /// Replaces the recurrence rule; `None` turns recurrence off.
    fn set_recurrence(&self, id: ChoreId, recurrence: Option<&Recurrence>) -> RepoResult<()>;
}

/// SQLite-backed chore repository.
pub struct SqliteChoreRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteChoreRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ChoreRepository for SqliteChoreRepository<'_> {
    fn create_chore(&self, chore: &NewChore) -> RepoResult<ChoreId> {
        chore.validate()?;
        let (is_recurring, kind, days) = recurrence_columns(chore.recurrence.as_ref());

        self.conn.execute(
            "INSERT INTO chores (
                room,
                task,
                frequency,
                estimated_time,
                is_recurring,
                recurrence_type,
                recurrence_days
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                chore.room.trim(),
                chore.task.trim(),
                chore.frequency.trim(),
                i64::from(chore.estimated_minutes),
                is_recurring,
                kind,
                days,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_chore(&self, id: ChoreId) -> RepoResult<Option<Chore>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHORE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_chore_row(row)?));
        }
        Ok(None)
    }

    fn list_chores(&self) -> RepoResult<Vec<Chore>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHORE_SELECT_SQL} ORDER BY room ASC, task ASC, id ASC;"))?;
        let chores = collect_chores(stmt.query([])?)?;
        Ok(chores)
    }

    fn list_recurring_chores(&self, kind: Option<RecurrenceKind>) -> RepoResult<Vec<Chore>> {
        let mut stmt = self.conn.prepare(&recurring_select_sql())?;
        let chores = collect_chores(stmt.query([kind.map(RecurrenceKind::as_str)])?)?;
        Ok(chores)
    }

    fn set_recurrence(&self, id: ChoreId, recurrence: Option<&Recurrence>) -> RepoResult<()> {
        validate_recurrence(recurrence)?;
        let (is_recurring, kind, days) = recurrence_columns(recurrence);

        let changed = self.conn.execute(
            "UPDATE chores
             SET
                is_recurring = ?1,
                recurrence_type = ?2,
                recurrence_days = ?3
             WHERE id = ?4;",
            params![is_recurring, kind, days, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "chore", id });
        }
        Ok(())
    }
}

/// Returns whether a chore row exists.
pub(crate) fn chore_exists(conn: &Connection, id: ChoreId) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM chores WHERE id = ?1;", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn recurring_select_sql() -> String {
    format!(
        "{CHORE_SELECT_SQL}
         WHERE is_recurring = 1
           AND (?1 IS NULL OR recurrence_type = ?1)
         ORDER BY id ASC;"
    )
}

/// Loads recurring chores for the generator.
///
/// Rows whose stored settings do not form a valid chore are set aside in
/// `RecurringChores::invalid` instead of failing the whole load.
pub(crate) fn load_recurring_chores(
    conn: &Connection,
    kind: Option<RecurrenceKind>,
) -> RepoResult<RecurringChores> {
    let mut stmt = conn.prepare(&recurring_select_sql())?;
    let mut rows = stmt.query([kind.map(RecurrenceKind::as_str)])?;
    let mut loaded = RecurringChores::default();
    while let Some(row) = rows.next()? {
        let reason = match parse_chore_row(row) {
            Ok(chore) => {
                loaded.chores.push(chore);
                continue;
            }
            Err(RepoError::InvalidData(message)) => message,
            Err(RepoError::Validation(err)) => err.to_string(),
            Err(err) => return Err(err),
        };
        loaded.invalid.push(InvalidChoreRow {
            chore_id: row.get("id")?,
            reason,
        });
    }
    Ok(loaded)
}

pub(crate) fn collect_chores(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Chore>> {
    let mut chores = Vec::new();
    while let Some(row) = rows.next()? {
        chores.push(parse_chore_row(row)?);
    }
    Ok(chores)
}

pub(crate) fn parse_chore_row(row: &Row<'_>) -> RepoResult<Chore> {
    let id: ChoreId = row.get("id")?;
    let is_recurring = int_to_bool(row.get("is_recurring")?, "chores.is_recurring")?;
    let kind_text: Option<String> = row.get("recurrence_type")?;
    let days_text: Option<String> = row.get("recurrence_days")?;

    let recurrence = parse_recurrence(id, is_recurring, kind_text, days_text)?;
    let chore = Chore {
        id,
        room: row.get("room")?,
        task: row.get("task")?,
        frequency: row.get("frequency")?,
        estimated_minutes: int_to_minutes(row.get("estimated_time")?, "chores.estimated_time")?,
        recurrence,
    };
    chore.validate()?;
    Ok(chore)
}

fn parse_recurrence(
    id: ChoreId,
    is_recurring: bool,
    kind_text: Option<String>,
    days_text: Option<String>,
) -> RepoResult<Option<Recurrence>> {
    let days_text = days_text.filter(|days| !days.trim().is_empty());

    match (is_recurring, kind_text) {
        (false, None) if days_text.is_none() => Ok(None),
        (false, _) => Err(RepoError::InvalidData(format!(
            "chore {id} is not recurring but carries recurrence settings"
        ))),
        (true, None) => Err(RepoError::InvalidData(format!(
            "chore {id} is recurring without recurrence_type"
        ))),
        (true, Some(kind_text)) => {
            let kind = RecurrenceKind::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid recurrence type `{kind_text}` in chores.recurrence_type"
                ))
            })?;
            Recurrence::from_parts(kind, days_text.as_deref())
                .map(Some)
                .map_err(|err| RepoError::InvalidData(format!("chore {id}: {err}")))
        }
    }
}

fn recurrence_columns(
    recurrence: Option<&Recurrence>,
) -> (i64, Option<&'static str>, Option<String>) {
    match recurrence {
        Some(rule) => (
            bool_to_int(true),
            Some(rule.kind().as_str()),
            rule.days_string(),
        ),
        None => (bool_to_int(false), None, None),
    }
}
