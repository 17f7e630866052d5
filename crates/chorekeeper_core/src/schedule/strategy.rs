//! Assignee selection strategies.
//!
//! # Responsibility
//! - Define the `AssignmentStrategy` seam used by the generator.
//! - Provide uniform-random (default), round-robin and
//!   least-recently-assigned policies.
//!
//! # Invariants
//! - Strategies only read the pool; the generator records picks.
//! - Every strategy returns `EmptyPersonPool` for an empty pool.

use super::ScheduleError;
use crate::model::chore::Chore;
use crate::model::person::PersonId;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One selectable person plus assignment history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignee {
    pub person_id: PersonId,
    /// Latest assigned date of any assignment held by this person.
    pub last_assigned: Option<NaiveDate>,
}

/// Everyone who may receive a generated assignment, ordered by person id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneePool {
    members: Vec<Assignee>,
}

impl AssigneePool {
    pub fn new(members: impl IntoIterator<Item = Assignee>) -> Self {
        let mut members: Vec<Assignee> = members.into_iter().collect();
        members.sort_by_key(|member| member.person_id);
        members.dedup_by_key(|member| member.person_id);
        Self { members }
    }

    /// Pool without assignment history.
    pub fn from_ids(ids: impl IntoIterator<Item = PersonId>) -> Self {
        Self::new(ids.into_iter().map(|person_id| Assignee {
            person_id,
            last_assigned: None,
        }))
    }

    pub fn members(&self) -> &[Assignee] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Notes a fresh assignment so later picks in the same run see it.
    pub fn record_assignment(&mut self, person_id: PersonId, date: NaiveDate) {
        if let Some(member) = self
            .members
            .iter_mut()
            .find(|member| member.person_id == person_id)
        {
            member.last_assigned = member.last_assigned.max(Some(date));
        }
    }
}

/// Policy choosing the assignee for one due chore.
pub trait AssignmentStrategy {
    /// Stable name used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Picks one person from `pool` for `chore`.
    ///
    /// # Errors
    /// - `ScheduleError::EmptyPersonPool` when `pool` is empty.
    fn select(&mut self, chore: &Chore, pool: &AssigneePool) -> Result<PersonId, ScheduleError>;
}

impl<T: AssignmentStrategy + ?Sized> AssignmentStrategy for &mut T {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn select(&mut self, chore: &Chore, pool: &AssigneePool) -> Result<PersonId, ScheduleError> {
        (**self).select(chore, pool)
    }
}

impl<T: AssignmentStrategy + ?Sized> AssignmentStrategy for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn select(&mut self, chore: &Chore, pool: &AssigneePool) -> Result<PersonId, ScheduleError> {
        (**self).select(chore, pool)
    }
}

/// Independent uniform pick from the whole pool for every chore.
#[derive(Debug, Clone)]
pub struct UniformRandom<R = StdRng> {
    rng: R,
}

impl UniformRandom<StdRng> {
    /// Entropy-seeded generator.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformRandom<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> UniformRandom<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> AssignmentStrategy for UniformRandom<R> {
    fn name(&self) -> &'static str {
        StrategyKind::UniformRandom.as_str()
    }

    fn select(&mut self, _chore: &Chore, pool: &AssigneePool) -> Result<PersonId, ScheduleError> {
        pool.members()
            .choose(&mut self.rng)
            .map(|member| member.person_id)
            .ok_or(ScheduleError::EmptyPersonPool)
    }
}

/// Rotates through the pool in person-id order.
///
/// The cursor lives in the strategy, so one instance reused across several
/// dates keeps rotating instead of restarting at the lowest id.
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    next: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(offset: usize) -> Self {
        Self { next: offset }
    }
}

impl AssignmentStrategy for RoundRobin {
    fn name(&self) -> &'static str {
        StrategyKind::RoundRobin.as_str()
    }

    fn select(&mut self, _chore: &Chore, pool: &AssigneePool) -> Result<PersonId, ScheduleError> {
        if pool.is_empty() {
            return Err(ScheduleError::EmptyPersonPool);
        }
        let member = pool.members()[self.next % pool.len()];
        self.next = self.next.wrapping_add(1);
        Ok(member.person_id)
    }
}

/// Picks whoever has gone longest without an assignment.
///
/// People never assigned come first; ties go to the lowest person id.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastRecentlyAssigned;

impl AssignmentStrategy for LeastRecentlyAssigned {
    fn name(&self) -> &'static str {
        StrategyKind::LeastRecentlyAssigned.as_str()
    }

    fn select(&mut self, _chore: &Chore, pool: &AssigneePool) -> Result<PersonId, ScheduleError> {
        pool.members()
            .iter()
            .min_by_key(|member| (member.last_assigned, member.person_id))
            .map(|member| member.person_id)
            .ok_or(ScheduleError::EmptyPersonPool)
    }
}

/// Configurable strategy selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    UniformRandom,
    RoundRobin,
    LeastRecentlyAssigned,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UniformRandom => "uniform_random",
            Self::RoundRobin => "round_robin",
            Self::LeastRecentlyAssigned => "least_recently_assigned",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "uniform_random" | "random" => Some(Self::UniformRandom),
            "round_robin" => Some(Self::RoundRobin),
            "least_recently_assigned" => Some(Self::LeastRecentlyAssigned),
            _ => None,
        }
    }

    /// Builds the strategy; `seed` only affects `UniformRandom`.
    pub fn build(self, seed: Option<u64>) -> Box<dyn AssignmentStrategy> {
        match self {
            Self::UniformRandom => match seed {
                Some(seed) => Box::new(UniformRandom::seeded(seed)),
                None => Box::new(UniformRandom::new()),
            },
            Self::RoundRobin => Box::new(RoundRobin::new()),
            Self::LeastRecentlyAssigned => Box::new(LeastRecentlyAssigned),
        }
    }
}

impl Display for StrategyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Assignee, AssigneePool, AssignmentStrategy, LeastRecentlyAssigned, RoundRobin,
        StrategyKind, UniformRandom,
    };
    use crate::model::chore::Chore;
    use crate::model::recurrence::Recurrence;
    use crate::schedule::ScheduleError;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn chore() -> Chore {
        Chore {
            id: 1,
            room: "Kitchen".to_string(),
            task: "Dishes".to_string(),
            frequency: "Daily".to_string(),
            estimated_minutes: 15,
            recurrence: Some(Recurrence::Daily),
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn every_strategy_rejects_empty_pool() {
        let pool = AssigneePool::default();
        for kind in [
            StrategyKind::UniformRandom,
            StrategyKind::RoundRobin,
            StrategyKind::LeastRecentlyAssigned,
        ] {
            let mut strategy = kind.build(Some(7));
            assert!(matches!(
                strategy.select(&chore(), &pool),
                Err(ScheduleError::EmptyPersonPool)
            ));
        }
    }

    #[test]
    fn uniform_random_is_reproducible_with_seed_and_covers_pool() {
        let pool = AssigneePool::from_ids([3, 1, 2]);
        let mut first = UniformRandom::seeded(42);
        let mut second = UniformRandom::seeded(42);

        let picks_a: Vec<_> = (0..64).map(|_| first.select(&chore(), &pool).unwrap()).collect();
        let picks_b: Vec<_> = (0..64).map(|_| second.select(&chore(), &pool).unwrap()).collect();
        assert_eq!(picks_a, picks_b);

        let distinct: HashSet<_> = picks_a.into_iter().collect();
        assert_eq!(distinct, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn round_robin_rotates_in_id_order() {
        let pool = AssigneePool::from_ids([30, 10, 20]);
        let mut strategy = RoundRobin::new();
        let picks: Vec<_> = (0..5).map(|_| strategy.select(&chore(), &pool).unwrap()).collect();
        assert_eq!(picks, vec![10, 20, 30, 10, 20]);

        let mut offset = RoundRobin::starting_at(2);
        assert_eq!(offset.select(&chore(), &pool).unwrap(), 30);
    }

    #[test]
    fn least_recently_assigned_prefers_never_assigned_then_oldest() {
        let mut pool = AssigneePool::new([
            Assignee {
                person_id: 1,
                last_assigned: Some(date(10)),
            },
            Assignee {
                person_id: 2,
                last_assigned: Some(date(3)),
            },
            Assignee {
                person_id: 3,
                last_assigned: None,
            },
        ]);
        let mut strategy = LeastRecentlyAssigned;

        assert_eq!(strategy.select(&chore(), &pool).unwrap(), 3);
        pool.record_assignment(3, date(12));
        assert_eq!(strategy.select(&chore(), &pool).unwrap(), 2);
        pool.record_assignment(2, date(12));
        assert_eq!(strategy.select(&chore(), &pool).unwrap(), 1);
    }

    #[test]
    fn record_assignment_never_moves_history_backwards() {
        let mut pool = AssigneePool::new([Assignee {
            person_id: 5,
            last_assigned: Some(date(20)),
        }]);
        pool.record_assignment(5, date(4));
        assert_eq!(pool.members()[0].last_assigned, Some(date(20)));
    }

    #[test]
    fn strategy_kind_parses_config_spellings() {
        assert_eq!(
            StrategyKind::parse("Round-Robin"),
            Some(StrategyKind::RoundRobin)
        );
        assert_eq!(
            StrategyKind::parse("least_recently_assigned"),
            Some(StrategyKind::LeastRecentlyAssigned)
        );
        assert_eq!(StrategyKind::parse("fair"), None);
        assert_eq!(StrategyKind::default().build(None).name(), "uniform_random");
    }
}
