use chorekeeper_core::db::migrations::latest_version;
use chorekeeper_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "people",
        "chores",
        "assignments",
        "completions",
        "parental_reviews",
    ] {
        assert_object_exists(&conn, "table", table);
    }
    assert_object_exists(&conn, "view", "daily_completion_summary");
    assert_object_exists(&conn, "view", "individual_completion_summary");
    assert_object_exists(&conn, "index", "idx_assignments_chore_date");
}

#[test]
fn chores_default_to_non_recurring() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO chores (room, task, frequency, estimated_time)
         VALUES ('Kitchen', 'Dishes', 'Daily', 15);",
        [],
    )
    .unwrap();

    let (flag, kind): (i64, Option<String>) = conn
        .query_row(
            "SELECT is_recurring, recurrence_type FROM chores;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(flag, 0);
    assert_eq!(kind, None);
}

#[test]
fn schema_rejects_unknown_recurrence_type() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute(
        "INSERT INTO chores (room, task, frequency, estimated_time, is_recurring, recurrence_type)
         VALUES ('Yard', 'Mow', 'Weekly', 45, 1, 'fortnightly');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chorekeeper.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_object_exists(&conn_second, "table", "parental_reviews");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
