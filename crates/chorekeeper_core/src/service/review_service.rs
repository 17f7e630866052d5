//! Completion and parental review use-case service.
//!
//! # Responsibility
//! - Mark assignments complete.
//! - Record parent approvals or rejections.
//! - Serve the review queue.
//!
//! # Invariants
//! - One completion per assignment; one review per completion.
//! - Only people with role `parent` may review.

use crate::model::assignment::AssignmentId;
use crate::model::person::PersonId;
use crate::model::review::{
    Completion, CompletionId, NewCompletion, NewReview, ParentalReview,
};
use crate::model::DateRange;
use crate::repo::person_repo::PersonRepository;
use crate::repo::review_repo::{ReviewQueueEntry, ReviewRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for completion/review use-cases.
#[derive(Debug)]
pub enum ReviewServiceError {
    AssignmentNotFound(AssignmentId),
    AlreadyCompleted(AssignmentId),
    CompletionNotFound(CompletionId),
    AlreadyReviewed(CompletionId),
    ReviewerNotFound(PersonId),
    ReviewerNotParent(PersonId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for ReviewServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AssignmentNotFound(id) => write!(f, "assignment not found: {id}"),
            Self::AlreadyCompleted(id) => write!(f, "assignment already completed: {id}"),
            Self::CompletionNotFound(id) => write!(f, "completion not found: {id}"),
            Self::AlreadyReviewed(id) => write!(f, "completion already reviewed: {id}"),
            Self::ReviewerNotFound(id) => write!(f, "reviewer not found: {id}"),
            Self::ReviewerNotParent(id) => write!(f, "reviewer is not a parent: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent review state: {details}"),
        }
    }
}

impl Error for ReviewServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReviewServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Review service over completion/review and people repositories.
pub struct ReviewService<R: ReviewRepository, P: PersonRepository> {
    repo: R,
    people: P,
}

impl<R: ReviewRepository, P: PersonRepository> ReviewService<R, P> {
    pub fn new(repo: R, people: P) -> Self {
        Self { repo, people }
    }

    /// Records that an assignment was finished.
    pub fn complete_assignment(
        &self,
        completion: &NewCompletion,
    ) -> Result<Completion, ReviewServiceError> {
        let assignment_id = completion.assignment_id;
        if !self.repo.assignment_exists(assignment_id)? {
            return Err(ReviewServiceError::AssignmentNotFound(assignment_id));
        }
        if self.repo.completion_for_assignment(assignment_id)?.is_some() {
            return Err(ReviewServiceError::AlreadyCompleted(assignment_id));
        }

        let id = self.repo.create_completion(completion)?;
        info!(
            "event=assignment_complete module=service status=ok assignment_id={} completion_id={} actual_minutes={} has_photo={}",
            assignment_id,
            id,
            completion.actual_minutes,
            completion.photo_filename.is_some()
        );
        self.repo
            .get_completion(id)?
            .ok_or(ReviewServiceError::InconsistentState(
                "created completion not found in read-back",
            ))
    }

    /// Records a parent's approval or rejection of a completion.
    pub fn review_completion(
        &self,
        review: &NewReview,
    ) -> Result<ParentalReview, ReviewServiceError> {
        let reviewer = self
            .people
            .get_person(review.reviewer_id)?
            .ok_or(ReviewServiceError::ReviewerNotFound(review.reviewer_id))?;
        if !reviewer.is_parent() {
            warn!(
                "event=review_submit module=service status=rejected completion_id={} reviewer_id={} reason=not_parent",
                review.completion_id, reviewer.id
            );
            return Err(ReviewServiceError::ReviewerNotParent(reviewer.id));
        }
        if self.repo.get_completion(review.completion_id)?.is_none() {
            return Err(ReviewServiceError::CompletionNotFound(review.completion_id));
        }
        if self
            .repo
            .review_for_completion(review.completion_id)?
            .is_some()
        {
            return Err(ReviewServiceError::AlreadyReviewed(review.completion_id));
        }

        self.repo.create_review(review)?;
        info!(
            "event=review_submit module=service status=ok completion_id={} reviewer_id={} approved={}",
            review.completion_id, reviewer.id, review.approved
        );
        self.repo
            .review_for_completion(review.completion_id)?
            .ok_or(ReviewServiceError::InconsistentState(
                "created review not found in read-back",
            ))
    }

    /// Completions in `range`; unreviewed only unless `include_reviewed`.
    pub fn review_queue(
        &self,
        range: &DateRange,
        include_reviewed: bool,
    ) -> Result<Vec<ReviewQueueEntry>, ReviewServiceError> {
        Ok(self.repo.review_queue(range, include_reviewed)?)
    }
}
