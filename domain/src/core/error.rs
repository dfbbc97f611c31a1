//! Domain error types

use crate::agent::AgentId;
use crate::orchestration::stage::Stage;
use crate::roles::SolverSlot;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Insufficient participants for {stage}: {available} available, {required} required")]
    InsufficientParticipants {
        stage: Stage,
        required: usize,
        available: usize,
    },

    #[error("Role integrity violation: {0}")]
    RoleIntegrity(String),

    #[error("Agent {0} cannot review its own solution")]
    SelfReview(AgentId),

    #[error("{slot} has no {missing}")]
    IncompleteSolver {
        slot: SolverSlot,
        missing: &'static str,
    },

    #[error("Invalid session transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Invalid agent: {0}")]
    InvalidAgent(String),
}

impl DomainError {
    /// Short machine-friendly name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::InsufficientParticipants { .. } => "insufficient_participants",
            DomainError::RoleIntegrity(_) | DomainError::SelfReview(_) => "role_integrity",
            DomainError::IncompleteSolver { .. } => "incomplete_solver",
            DomainError::InvalidTransition { .. } => "invalid_transition",
            DomainError::InvalidProblem(_) => "invalid_problem",
            DomainError::InvalidAgent(_) => "invalid_agent",
        }
    }
}
