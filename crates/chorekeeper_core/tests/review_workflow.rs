use chorekeeper_core::db::open_db_in_memory;
use chorekeeper_core::repo::assignment_repo::{BoardStatus, SqliteAssignmentRepository};
use chorekeeper_core::repo::chore_repo::{ChoreRepository, SqliteChoreRepository};
use chorekeeper_core::repo::person_repo::{PersonRepository, SqlitePersonRepository};
use chorekeeper_core::repo::review_repo::SqliteReviewRepository;
use chorekeeper_core::{
    AssignmentId, AssignmentService, DateRange, NewChore, NewCompletion, NewPerson, NewReview,
    PersonId, PersonRole, ReviewService, ReviewServiceError,
};
use chrono::NaiveDate;
use rusqlite::Connection;

struct Household {
    parent: PersonId,
    child: PersonId,
    assignment: AssignmentId,
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
}

fn seed(conn: &Connection) -> Household {
    let chore = SqliteChoreRepository::new(conn)
        .create_chore(&NewChore::new("Kitchen", "Dishes", "Daily", 15))
        .unwrap();
    let people = SqlitePersonRepository::new(conn);
    let parent = people
        .create_person(&NewPerson::new("Robin", PersonRole::Parent))
        .unwrap();
    let child = people
        .create_person(&NewPerson::new("Sam", PersonRole::Child))
        .unwrap();
    let assignment = AssignmentService::new(SqliteAssignmentRepository::new(conn))
        .assign_chore(chore, child, day(), None)
        .unwrap();
    Household {
        parent,
        child,
        assignment: assignment.id,
    }
}

fn completion(assignment_id: AssignmentId) -> NewCompletion {
    NewCompletion {
        assignment_id,
        actual_minutes: 18,
        notes: Some("all dry".to_string()),
        photo_filename: Some("dishes.jpg".to_string()),
    }
}

#[test]
fn completion_is_recorded_once_per_assignment() {
    let conn = open_db_in_memory().unwrap();
    let house = seed(&conn);
    let service = ReviewService::new(
        SqliteReviewRepository::new(&conn),
        SqlitePersonRepository::new(&conn),
    );

    let done = service
        .complete_assignment(&completion(house.assignment))
        .unwrap();
    assert_eq!(done.assignment_id, house.assignment);
    assert_eq!(done.actual_minutes, 18);
    assert_eq!(done.photo_filename.as_deref(), Some("dishes.jpg"));

    assert!(matches!(
        service.complete_assignment(&completion(house.assignment)),
        Err(ReviewServiceError::AlreadyCompleted(id)) if id == house.assignment
    ));
    assert!(matches!(
        service.complete_assignment(&completion(999)),
        Err(ReviewServiceError::AssignmentNotFound(999))
    ));
}

#[test]
fn only_parents_may_review() {
    let conn = open_db_in_memory().unwrap();
    let house = seed(&conn);
    let service = ReviewService::new(
        SqliteReviewRepository::new(&conn),
        SqlitePersonRepository::new(&conn),
    );
    let done = service
        .complete_assignment(&completion(house.assignment))
        .unwrap();

    let by_child = service.review_completion(&NewReview {
        completion_id: done.id,
        reviewer_id: house.child,
        approved: true,
        review_notes: None,
    });
    assert!(matches!(
        by_child,
        Err(ReviewServiceError::ReviewerNotParent(id)) if id == house.child
    ));

    let by_stranger = service.review_completion(&NewReview {
        completion_id: done.id,
        reviewer_id: 77,
        approved: true,
        review_notes: None,
    });
    assert!(matches!(by_stranger, Err(ReviewServiceError::ReviewerNotFound(77))));
}

#[test]
fn parent_review_is_stored_once_and_shows_on_board() {
    let conn = open_db_in_memory().unwrap();
    let house = seed(&conn);
    let service = ReviewService::new(
        SqliteReviewRepository::new(&conn),
        SqlitePersonRepository::new(&conn),
    );
    let done = service
        .complete_assignment(&completion(house.assignment))
        .unwrap();

    let review = NewReview {
        completion_id: done.id,
        reviewer_id: house.parent,
        approved: false,
        review_notes: Some("spots on glasses".to_string()),
    };
    let stored = service.review_completion(&review).unwrap();
    assert_eq!(stored.completion_id, done.id);
    assert_eq!(stored.reviewer_id, house.parent);
    assert!(!stored.approved);

    assert!(matches!(
        service.review_completion(&review),
        Err(ReviewServiceError::AlreadyReviewed(id)) if id == done.id
    ));

    let board = AssignmentService::new(SqliteAssignmentRepository::new(&conn))
        .day_board(day())
        .unwrap();
    assert_eq!(board[0].status(), BoardStatus::Rejected);
    assert_eq!(board[0].reviewed_by.as_deref(), Some("Robin"));
}

#[test]
fn reviewing_missing_completion_fails() {
    let conn = open_db_in_memory().unwrap();
    let house = seed(&conn);
    let service = ReviewService::new(
        SqliteReviewRepository::new(&conn),
        SqlitePersonRepository::new(&conn),
    );

    let result = service.review_completion(&NewReview {
        completion_id: 55,
        reviewer_id: house.parent,
        approved: true,
        review_notes: None,
    });
    assert!(matches!(result, Err(ReviewServiceError::CompletionNotFound(55))));
}

#[test]
fn review_queue_hides_reviewed_unless_requested() {
    let conn = open_db_in_memory().unwrap();
    let house = seed(&conn);
    let service = ReviewService::new(
        SqliteReviewRepository::new(&conn),
        SqlitePersonRepository::new(&conn),
    );
    let done = service
        .complete_assignment(&completion(house.assignment))
        .unwrap();
    let range = DateRange::single_day(day());

    let pending = service.review_queue(&range, false).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].completed_by, "Sam");
    assert_eq!(pending[0].task, "Dishes");
    assert_eq!(pending[0].review_id, None);

    service
        .review_completion(&NewReview {
            completion_id: done.id,
            reviewer_id: house.parent,
            approved: true,
            review_notes: None,
        })
        .unwrap();

    assert!(service.review_queue(&range, false).unwrap().is_empty());
    let all = service.review_queue(&range, true).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].approved, Some(true));

    let next_week = DateRange::single_day(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    assert!(service.review_queue(&next_week, true).unwrap().is_empty());
}
