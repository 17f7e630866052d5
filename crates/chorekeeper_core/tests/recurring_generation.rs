use chorekeeper_core::db::{open_db, open_db_in_memory};
use chorekeeper_core::repo::assignment_repo::{AssignmentRepository, SqliteAssignmentRepository};
use chorekeeper_core::repo::chore_repo::{ChoreRepository, SqliteChoreRepository};
use chorekeeper_core::repo::person_repo::{PersonRepository, SqlitePersonRepository};
use chorekeeper_core::schedule::{
    generate_recurring_assignments, parse_target_date, LeastRecentlyAssigned, RoundRobin,
    ScheduleError, UniformRandom,
};
use chorekeeper_core::{
    ChoreId, NewAssignment, NewChore, NewPerson, PersonId, PersonRole, Recurrence, StrategyKind,
    WeekdaySet,
};
use chrono::{Days, NaiveDate};
use rusqlite::Connection;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn monday() -> NaiveDate {
    date(2026, 10, 12)
}

fn add_person(conn: &Connection, name: &str) -> PersonId {
    SqlitePersonRepository::new(conn)
        .create_person(&NewPerson::new(name, PersonRole::Child))
        .unwrap()
}

fn add_chore(conn: &Connection, task: &str, recurrence: Option<Recurrence>) -> ChoreId {
    let mut chore = NewChore::new("House", task, "Daily", 10);
    chore.recurrence = recurrence;
    SqliteChoreRepository::new(conn).create_chore(&chore).unwrap()
}

fn assignment_count(conn: &Connection, chore_id: ChoreId) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM assignments WHERE chore_id = ?1;",
        [chore_id],
        |row| row.get(0),
    )
    .unwrap()
}

fn generate_range(conn: &mut Connection, start: NaiveDate, days: u64) {
    for offset in 0..days {
        let day = start.checked_add_days(Days::new(offset)).unwrap();
        generate_recurring_assignments(conn, UniformRandom::seeded(offset), day).unwrap();
    }
}

#[test]
fn example_household_gets_two_on_monday_and_one_on_tuesday() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = add_person(&conn, "Alice");
    let bob = add_person(&conn, "Bob");
    add_chore(&conn, "Dishes", Some(Recurrence::Daily));
    add_chore(&conn, "Vacuum", Some(Recurrence::Weekly));

    let monday_report =
        generate_recurring_assignments(&mut conn, UniformRandom::seeded(1), monday()).unwrap();
    assert_eq!(monday_report.created, 2);
    assert_eq!(monday_report.due_chores, 2);

    let tuesday = date(2026, 10, 13);
    let tuesday_report =
        generate_recurring_assignments(&mut conn, UniformRandom::seeded(2), tuesday).unwrap();
    assert_eq!(tuesday_report.created, 1);

    let repo = SqliteAssignmentRepository::new(&conn);
    for assignment in repo.list_for_date(monday()).unwrap() {
        assert!([alice, bob].contains(&assignment.person_id));
        assert_eq!(assignment.due_date, Some(monday()));
    }
}

#[test]
fn rerunning_same_date_creates_nothing_and_keeps_one_row_per_chore() {
    let mut conn = open_db_in_memory().unwrap();
    add_person(&conn, "Alice");
    add_person(&conn, "Bob");
    let dishes = add_chore(&conn, "Dishes", Some(Recurrence::Daily));
    let vacuum = add_chore(&conn, "Vacuum", Some(Recurrence::Weekly));

    generate_recurring_assignments(&mut conn, UniformRandom::seeded(7), monday()).unwrap();
    let second =
        generate_recurring_assignments(&mut conn, UniformRandom::seeded(8), monday()).unwrap();

    assert_eq!(second.created, 0);
    assert_eq!(second.already_assigned, 2);
    assert!(second.assignments.is_empty());
    assert_eq!(assignment_count(&conn, dishes), 1);
    assert_eq!(assignment_count(&conn, vacuum), 1);
}

#[test]
fn existing_manual_assignment_is_left_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    add_person(&conn, "Alice");
    let bob = add_person(&conn, "Bob");
    let dishes = add_chore(&conn, "Dishes", Some(Recurrence::Daily));
    SqliteAssignmentRepository::new(&conn)
        .upsert_assignment(&NewAssignment::same_day(dishes, bob, monday()))
        .unwrap();

    let report =
        generate_recurring_assignments(&mut conn, UniformRandom::seeded(3), monday()).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(report.already_assigned, 1);

    let assignments = SqliteAssignmentRepository::new(&conn)
        .list_for_date(monday())
        .unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].person_id, bob);
}

#[test]
fn weekly_chore_lands_only_on_mondays_across_a_month() {
    let mut conn = open_db_in_memory().unwrap();
    add_person(&conn, "Alice");
    let weekly = add_chore(&conn, "Vacuum", Some(Recurrence::Weekly));

    generate_range(&mut conn, date(2026, 10, 1), 31);

    let dates: Vec<NaiveDate> = {
        let mut stmt = conn
            .prepare("SELECT assigned_date FROM assignments WHERE chore_id = ?1 ORDER BY assigned_date;")
            .unwrap();
        let rows = stmt.query_map([weekly], |row| row.get(0)).unwrap();
        rows.collect::<Result<_, _>>().unwrap()
    };
    assert_eq!(
        dates,
        vec![
            date(2026, 10, 5),
            date(2026, 10, 12),
            date(2026, 10, 19),
            date(2026, 10, 26)
        ]
    );
}

#[test]
fn weekdays_and_specific_days_follow_weekday_codes_over_a_week() {
    let mut conn = open_db_in_memory().unwrap();
    add_person(&conn, "Alice");
    let weekdays = add_chore(&conn, "Lunchboxes", Some(Recurrence::Weekdays));
    let specific = add_chore(
        &conn,
        "Trash",
        Some(Recurrence::SpecificDays(
            WeekdaySet::parse_list("M,W,F").unwrap(),
        )),
    );
    let weekend = add_chore(
        &conn,
        "Laundry",
        Some(Recurrence::SpecificDays(
            WeekdaySet::parse_list("SA,SU").unwrap(),
        )),
    );

    generate_range(&mut conn, monday(), 7);

    assert_eq!(assignment_count(&conn, weekdays), 5);
    assert_eq!(assignment_count(&conn, specific), 3);
    assert_eq!(assignment_count(&conn, weekend), 2);
    let saturday_weekdays: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM assignments WHERE chore_id = ?1 AND assigned_date = ?2;",
            rusqlite::params![weekdays, date(2026, 10, 17)],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(saturday_weekdays, 0);
}

#[test]
fn monthly_and_non_recurring_chores_are_never_generated() {
    let mut conn = open_db_in_memory().unwrap();
    add_person(&conn, "Alice");
    let monthly = add_chore(&conn, "Fridge", Some(Recurrence::Monthly));
    let one_off = add_chore(&conn, "Gutters", None);

    generate_range(&mut conn, date(2026, 10, 1), 31);

    assert_eq!(assignment_count(&conn, monthly), 0);
    assert_eq!(assignment_count(&conn, one_off), 0);
}

#[test]
fn empty_household_skips_due_chores() {
    let mut conn = open_db_in_memory().unwrap();
    add_chore(&conn, "Dishes", Some(Recurrence::Daily));

    let report =
        generate_recurring_assignments(&mut conn, UniformRandom::seeded(0), monday()).unwrap();
    assert_eq!(report.due_chores, 1);
    assert_eq!(report.created, 0);
    assert_eq!(report.skipped_without_assignee, 1);
}

#[test]
fn least_recently_assigned_uses_assignment_history() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = add_person(&conn, "Alice");
    let bob = add_person(&conn, "Bob");
    let one_off = add_chore(&conn, "Gutters", None);
    SqliteAssignmentRepository::new(&conn)
        .upsert_assignment(&NewAssignment::same_day(one_off, alice, date(2026, 10, 11)))
        .unwrap();
    let first = add_chore(&conn, "Dishes", Some(Recurrence::Daily));
    let second = add_chore(&conn, "Sweep", Some(Recurrence::Daily));

    let report =
        generate_recurring_assignments(&mut conn, LeastRecentlyAssigned, monday()).unwrap();

    let picks: Vec<(ChoreId, PersonId)> = report
        .assignments
        .iter()
        .map(|generated| (generated.chore_id, generated.person_id))
        .collect();
    assert_eq!(picks, vec![(first, bob), (second, alice)]);
}

#[test]
fn round_robin_and_boxed_strategies_are_accepted() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = add_person(&conn, "Alice");
    let bob = add_person(&conn, "Bob");
    add_chore(&conn, "Dishes", Some(Recurrence::Daily));
    add_chore(&conn, "Sweep", Some(Recurrence::Daily));

    let report = generate_recurring_assignments(&mut conn, RoundRobin::new(), monday()).unwrap();
    let people: Vec<PersonId> = report.assignments.iter().map(|a| a.person_id).collect();
    assert_eq!(people, vec![alice, bob]);

    let boxed = StrategyKind::UniformRandom.build(Some(42));
    let tuesday = date(2026, 10, 13);
    let report = generate_recurring_assignments(&mut conn, boxed, tuesday).unwrap();
    assert_eq!(report.created, 2);
}

#[test]
fn separate_connections_to_one_file_do_not_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("household.db");

    let mut first = open_db(&path).unwrap();
    add_person(&first, "Alice");
    let dishes = add_chore(&first, "Dishes", Some(Recurrence::Daily));
    let mut second = open_db(&path).unwrap();

    let a = generate_recurring_assignments(&mut first, UniformRandom::seeded(1), monday()).unwrap();
    let b =
        generate_recurring_assignments(&mut second, UniformRandom::seeded(2), monday()).unwrap();

    assert_eq!(a.created + b.created, 1);
    assert_eq!(assignment_count(&first, dishes), 1);
}

#[test]
fn malformed_date_is_rejected_before_generation() {
    let err = parse_target_date("2026-13-01").unwrap_err();
    assert!(matches!(err, ScheduleError::InvalidDate { .. }));
    assert_eq!(parse_target_date(" 2026-10-12 ").unwrap(), monday());
}

#[test]
fn chore_saved_without_weekday_codes_is_skipped_not_fatal() {
    let mut conn = open_db_in_memory().unwrap();
    add_person(&conn, "Alice");
    let dishes = add_chore(&conn, "Dishes", Some(Recurrence::Daily));
    conn.execute(
        "INSERT INTO chores (room, task, estimated_time, is_recurring, recurrence_type, recurrence_days)
         VALUES ('Yard', 'Mow', 10, 1, 'specific_days', '');",
        [],
    )
    .unwrap();
    let mow = conn.last_insert_rowid();

    let report =
        generate_recurring_assignments(&mut conn, UniformRandom::seeded(1), monday()).unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.skipped_invalid, 1);
    assert_eq!(assignment_count(&conn, dishes), 1);
    assert_eq!(assignment_count(&conn, mow), 0);
}

#[test]
fn failed_insert_rolls_back_the_whole_run() {
    let mut conn = open_db_in_memory().unwrap();
    add_person(&conn, "Alice");
    let dishes = add_chore(&conn, "Dishes", Some(Recurrence::Daily));
    let vacuum = add_chore(&conn, "Vacuum", Some(Recurrence::Daily));
    conn.execute_batch(&format!(
        "CREATE TRIGGER refuse_vacuum BEFORE INSERT ON assignments
         WHEN NEW.chore_id = {vacuum}
         BEGIN
             SELECT RAISE(ABORT, 'vacuum insert refused');
         END;"
    ))
    .unwrap();

    let err = generate_recurring_assignments(&mut conn, RoundRobin::new(), monday()).unwrap_err();
    assert!(matches!(err, ScheduleError::StoreUnavailable(_)));

    let on_monday: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM assignments WHERE assigned_date = ?1;",
            [monday()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(on_monday, 0);
    assert_eq!(assignment_count(&conn, dishes), 0);

    conn.execute_batch("DROP TRIGGER refuse_vacuum;").unwrap();
    let report = generate_recurring_assignments(&mut conn, RoundRobin::new(), monday()).unwrap();
    assert_eq!(report.created, 2);
}

#[test]
fn rerunning_a_date_leaves_round_robin_rotation_in_place() {
    let mut conn = open_db_in_memory().unwrap();
    let alice = add_person(&conn, "Alice");
    let bob = add_person(&conn, "Bob");
    add_chore(&conn, "Dishes", Some(Recurrence::Daily));
    let mut strategy = RoundRobin::new();

    let first = generate_recurring_assignments(&mut conn, &mut strategy, monday()).unwrap();
    let rerun = generate_recurring_assignments(&mut conn, &mut strategy, monday()).unwrap();
    let tuesday =
        generate_recurring_assignments(&mut conn, &mut strategy, date(2026, 10, 13)).unwrap();

    assert_eq!(rerun.already_assigned, 1);
    assert_eq!(first.assignments[0].person_id, alice);
    assert_eq!(tuesday.assignments[0].person_id, bob);
}
