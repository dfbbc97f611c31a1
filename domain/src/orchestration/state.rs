//! Session state machine
//!
//! `Created → RolesAssigned → Solved → Reviewed → Refined → Judged → Complete`
//! with `Aborted` reachable from any non-terminal state. There are no
//! backward transitions and no skipping ahead.

use super::stage::Stage;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Created,
    RolesAssigned,
    Solved,
    Reviewed,
    Refined,
    Judged,
    Complete,
    Aborted { stage: Stage, reason: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Created => "created",
            SessionState::RolesAssigned => "roles_assigned",
            SessionState::Solved => "solved",
            SessionState::Reviewed => "reviewed",
            SessionState::Refined => "refined",
            SessionState::Judged => "judged",
            SessionState::Complete => "complete",
            SessionState::Aborted { .. } => "aborted",
        }
    }

    /// The only state reachable by advancing
    pub fn successor(&self) -> Option<SessionState> {
        match self {
            SessionState::Created => Some(SessionState::RolesAssigned),
            SessionState::RolesAssigned => Some(SessionState::Solved),
            SessionState::Solved => Some(SessionState::Reviewed),
            SessionState::Reviewed => Some(SessionState::Refined),
            SessionState::Refined => Some(SessionState::Judged),
            SessionState::Judged => Some(SessionState::Complete),
            SessionState::Complete | SessionState::Aborted { .. } => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Aborted { .. })
    }

    /// Move to `next`, which must be the immediate successor
    pub fn advance(&mut self, next: SessionState) -> Result<(), DomainError> {
        if self.successor().as_ref() != Some(&next) {
            return Err(DomainError::InvalidTransition {
                from: self.name().to_string(),
                to: next.name().to_string(),
            });
        }
        *self = next;
        Ok(())
    }

    /// End the session because `stage` could not complete
    pub fn abort(&mut self, stage: Stage, reason: impl Into<String>) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidTransition {
                from: self.name().to_string(),
                to: "aborted".to_string(),
            });
        }
        *self = SessionState::Aborted {
            stage,
            reason: reason.into(),
        };
        Ok(())
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Aborted { stage, reason } => {
                write!(f, "aborted at {}: {}", stage, reason)
            }
            other => f.write_str(other.name()),
        }
    }
}
