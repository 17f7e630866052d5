//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod assignment_service;
pub mod chore_service;
pub mod household_service;
pub mod review_service;
