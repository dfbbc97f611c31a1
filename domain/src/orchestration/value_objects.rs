//! Orchestration value objects - immutable result types for debate runs.
//!
//! - [`UnitFailure`] - One excluded unit of work and why
//! - [`SessionOutcome`] - How a session ended
//! - [`SessionReport`] - Everything worth reporting about one problem
//! - [`RunReport`] - All sessions of a run, in problem order

use super::stage::Stage;
use crate::agent::AgentId;
use crate::roles::{RoleAssignment, SolverSlot};
use serde::{Deserialize, Serialize};

/// A unit excluded from its stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFailure {
    pub stage: Stage,
    pub agent_id: AgentId,
    pub error_kind: String,
    pub message: String,
}

/// Terminal outcome of one debate session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionOutcome {
    Complete {
        judge: AgentId,
        winner: SolverSlot,
        winner_agent: AgentId,
        final_answer: String,
        /// Number of solvers whose refined answer differs from their original
        answers_changed: usize,
    },
    Aborted {
        stage: Stage,
        reason: String,
    },
    /// Never started because the run was cancelled
    Cancelled,
}

impl SessionOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, SessionOutcome::Complete { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, SessionOutcome::Aborted { .. })
    }
}

/// Report for one problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub problem_id: String,
    pub outcome: SessionOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment: Option<RoleAssignment>,
    /// Ground-truth answer, for comparison with the final answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UnitFailure>,
    /// Solvers that held a solution but received no reviews to refine with
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refinement_skipped: Vec<SolverSlot>,
    pub elapsed_sec: f64,
}

impl SessionReport {
    pub fn cancelled(problem_id: impl Into<String>) -> Self {
        Self {
            problem_id: problem_id.into(),
            outcome: SessionOutcome::Cancelled,
            assignment: None,
            ground_answer: None,
            failures: Vec::new(),
            refinement_skipped: Vec::new(),
            elapsed_sec: 0.0,
        }
    }

    /// Case-insensitive comparison of the winning answer with the ground truth
    pub fn matches_ground_truth(&self) -> Option<bool> {
        match (&self.outcome, &self.ground_answer) {
            (SessionOutcome::Complete { final_answer, .. }, Some(truth)) => {
                Some(final_answer.trim().eq_ignore_ascii_case(truth.trim()))
            }
            _ => None,
        }
    }
}

/// Report for a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: String,
    pub sessions: Vec<SessionReport>,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.sessions.iter().filter(|s| s.outcome.is_complete()).count()
    }

    pub fn aborted(&self) -> usize {
        self.sessions.iter().filter(|s| s.outcome.is_aborted()).count()
    }

    pub fn cancelled(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| matches!(s.outcome, SessionOutcome::Cancelled))
            .count()
    }

    /// Number of completed sessions whose winning answer matched the ground truth
    pub fn correct(&self) -> usize {
        self.sessions
            .iter()
            .filter(|s| s.matches_ground_truth() == Some(true))
            .count()
    }

    /// True when sessions ran and none completed
    pub fn all_failed(&self) -> bool {
        !self.sessions.is_empty() && self.completed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(answer: &str, truth: &str) -> SessionReport {
        SessionReport {
            problem_id: "p".into(),
            outcome: SessionOutcome::Complete {
                judge: AgentId::new("A"),
                winner: SolverSlot::Two,
                winner_agent: AgentId::new("C"),
                final_answer: answer.into(),
                answers_changed: 1,
            },
            assignment: None,
            ground_answer: Some(truth.into()),
            failures: Vec::new(),
            refinement_skipped: Vec::new(),
            elapsed_sec: 1.0,
        }
    }

    #[test]
    fn test_ground_truth_comparison() {
        assert_eq!(complete(" green ", "Green").matches_ground_truth(), Some(true));
        assert_eq!(complete("Brown", "Green").matches_ground_truth(), Some(false));
        assert_eq!(SessionReport::cancelled("p").matches_ground_truth(), None);
    }

    #[test]
    fn test_run_counts() {
        let report = RunReport {
            run_id: "r".into(),
            started_at: "now".into(),
            sessions: vec![
                complete("Green", "Green"),
                SessionReport {
                    outcome: SessionOutcome::Aborted {
                        stage: Stage::Judge,
                        reason: "Solver 1 has no refined solution".into(),
                    },
                    ..SessionReport::cancelled("q")
                },
                SessionReport::cancelled("r"),
            ],
        };
        assert_eq!(report.completed(), 1);
        assert_eq!(report.aborted(), 1);
        assert_eq!(report.cancelled(), 1);
        assert_eq!(report.correct(), 1);
        assert!(!report.all_failed());
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(SessionOutcome::Aborted {
            stage: Stage::RoleAssessment,
            reason: "too few".into(),
        })
        .unwrap();
        assert_eq!(value["status"], "aborted");
        assert_eq!(value["stage"], "role_assessment");
    }
}
