//! Core domain logic for Chorekeeper.
//! This crate is the single source of truth for household chore invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::assignment::{Assignment, AssignmentId, NewAssignment};
pub use model::chore::{Chore, ChoreId, NewChore};
pub use model::person::{NewPerson, Person, PersonId, PersonRole};
pub use model::recurrence::{Recurrence, RecurrenceKind, WeekdayCode, WeekdaySet};
pub use model::review::{Completion, NewCompletion, NewReview, ParentalReview};
pub use model::{DateRange, ValidationError};
pub use repo::{RepoError, RepoResult};
pub use schedule::{
    generate_recurring_assignments, parse_target_date, AssignmentStrategy, GenerationReport,
    RecurringAssignmentGenerator, ScheduleError, StrategyKind,
};
pub use service::assignment_service::{AssignmentService, AssignmentServiceError};
pub use service::chore_service::{ChoreService, ChoreServiceError};
pub use service::household_service::HouseholdService;
pub use service::review_service::{ReviewService, ReviewServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
