//! Core domain concepts shared across all subdomains.
//!
//! - [`problem::Problem`] — a problem instance debated by the agents
//! - [`error::DomainError`] — domain-level errors

pub mod error;
pub mod problem;
