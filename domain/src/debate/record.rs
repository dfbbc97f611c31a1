//! Debate records
//!
//! A record is a stage output plus the bookkeeping needed to trace it:
//! which run and problem it belongs to, who produced it, how long the call
//! took and the exact prompts that were sent.

use super::output::{
    JudgmentOutput, RefinementOutput, ReviewOutput, RoleAssessmentOutput, SolutionOutput,
};
use crate::agent::AgentId;
use crate::core::error::DomainError;
use crate::roles::SolverSlot;
use serde::{Deserialize, Serialize};

/// Bookkeeping shared by every record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub id: String,
    pub run_id: String,
    pub problem_id: String,
    pub time_elapsed_sec: f64,
    pub prompt_system: String,
    pub prompt_user: String,
}

impl RecordMeta {
    pub fn new(id: impl Into<String>, run_id: impl Into<String>, problem_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            run_id: run_id.into(),
            problem_id: problem_id.into(),
            time_elapsed_sec: 0.0,
            prompt_system: String::new(),
            prompt_user: String::new(),
        }
    }

    pub fn with_prompts(mut self, system: impl Into<String>, user: impl Into<String>) -> Self {
        self.prompt_system = system.into();
        self.prompt_user = user.into();
        self
    }

    pub fn with_elapsed(mut self, seconds: f64) -> Self {
        self.time_elapsed_sec = seconds;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssessment {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub agent_id: AgentId,
    #[serde(flatten)]
    pub output: RoleAssessmentOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub solver_id: AgentId,
    #[serde(flatten)]
    pub output: SolutionOutput,
}

impl Solution {
    pub fn id(&self) -> &str {
        &self.meta.id
    }
}

/// A peer review handed from its reviewer to its reviewee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub reviewer_id: AgentId,
    pub reviewee_id: AgentId,
    pub solution_id: String,
    #[serde(flatten)]
    pub output: ReviewOutput,
}

impl Review {
    /// Bind a review output to the solution it evaluates
    ///
    /// Fails when the reviewer wrote the reviewed solution.
    pub fn new(
        meta: RecordMeta,
        reviewer_id: AgentId,
        reviewed: &Solution,
        output: ReviewOutput,
    ) -> Result<Self, DomainError> {
        if reviewer_id == reviewed.solver_id {
            return Err(DomainError::SelfReview(reviewer_id));
        }
        Ok(Self {
            meta,
            reviewer_id,
            reviewee_id: reviewed.solver_id.clone(),
            solution_id: reviewed.meta.id.clone(),
            output,
        })
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedSolution {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub solver_id: AgentId,
    pub parent_solution_id: String,
    pub review_ids: Vec<String>,
    #[serde(flatten)]
    pub output: RefinementOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub judge_id: AgentId,
    pub winner_agent_id: AgentId,
    #[serde(flatten)]
    pub output: JudgmentOutput,
}

impl Judgment {
    pub fn winner(&self) -> SolverSlot {
        self.output.winner_solver
    }
}
