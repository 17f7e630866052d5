//! Household member model.

use super::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// SQLite row id of `people`.
pub type PersonId = i64;

/// Household role. Only parents review completed chores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonRole {
    Parent,
    Child,
}

impl PersonRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parent" => Some(Self::Parent),
            "child" => Some(Self::Child),
            _ => None,
        }
    }
}

/// A possible assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub role: PersonRole,
}

impl Person {
    pub fn is_parent(&self) -> bool {
        self.role == PersonRole::Parent
    }
}

/// Insert model for a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub role: PersonRole,
}

impl NewPerson {
    pub fn new(name: impl Into<String>, role: PersonRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}
