//! Household member use-case service.

use crate::model::person::{NewPerson, Person, PersonId};
use crate::repo::person_repo::PersonRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// People facade over repository implementations.
pub struct HouseholdService<P: PersonRepository> {
    repo: P,
}

impl<P: PersonRepository> HouseholdService<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    /// Adds a person and returns the stored record.
    pub fn add_person(&self, person: &NewPerson) -> RepoResult<Person> {
        let id = self.repo.create_person(person)?;
        info!(
            "event=person_create module=service status=ok person_id={} role={}",
            id,
            person.role.as_str()
        );
        self.get_person(id)
    }

    pub fn get_person(&self, id: PersonId) -> RepoResult<Person> {
        self.repo.get_person(id)?.ok_or(RepoError::NotFound {
            entity: "person",
            id,
        })
    }

    /// Everyone ordered by name.
    pub fn list_people(&self) -> RepoResult<Vec<Person>> {
        self.repo.list_people()
    }
}
