//! People repository contracts and SQLite implementation.

use super::{RepoError, RepoResult};
use crate::model::person::{NewPerson, Person, PersonId, PersonRole};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PERSON_SELECT_SQL: &str = "SELECT id, name, role FROM people";

/// Repository interface for household members.
pub trait PersonRepository {
    fn create_person(&self, person: &NewPerson) -> RepoResult<PersonId>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    /// Lists everyone ordered by name, then id.
    fn list_people(&self) -> RepoResult<Vec<Person>>;
}

/// SQLite-backed people repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, person: &NewPerson) -> RepoResult<PersonId> {
        person.validate()?;
        self.conn.execute(
            "INSERT INTO people (name, role) VALUES (?1, ?2);",
            params![person.name.trim(), person.role.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_person_row(row)?));
        }
        Ok(None)
    }

    fn list_people(&self) -> RepoResult<Vec<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut people = Vec::new();
        while let Some(row) = rows.next()? {
            people.push(parse_person_row(row)?);
        }
        Ok(people)
    }
}

/// Returns whether a person row exists.
pub(crate) fn person_exists(conn: &Connection, id: PersonId) -> RepoResult<bool> {
    let found = conn
        .query_row("SELECT 1 FROM people WHERE id = ?1;", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn parse_person_row(row: &Row<'_>) -> RepoResult<Person> {
    let role_text: String = row.get("role")?;
    let role = PersonRole::parse(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in people.role"))
    })?;

    Ok(Person {
        id: row.get("id")?,
        name: row.get("name")?,
        role,
    })
}
