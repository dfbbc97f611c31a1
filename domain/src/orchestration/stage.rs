//! Debate stages

use serde::{Deserialize, Serialize};

/// One phase of the debate protocol, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Every agent scores its own fit for judging and solving
    RoleAssessment,
    /// Each solver answers independently
    Solve,
    /// Each solver reviews every other solver's solution
    PeerReview,
    /// Each reviewed solver revises its solution
    Refine,
    /// The judge picks the winning refined solution
    Judge,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::RoleAssessment,
        Stage::Solve,
        Stage::PeerReview,
        Stage::Refine,
        Stage::Judge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RoleAssessment => "role_assessment",
            Stage::Solve => "solve",
            Stage::PeerReview => "peer_review",
            Stage::Refine => "refine",
            Stage::Judge => "judge",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::RoleAssessment => "role assessment",
            Stage::Solve => "solve",
            Stage::PeerReview => "peer review",
            Stage::Refine => "refine",
            Stage::Judge => "judge",
        }
    }

    /// Document-store collection receiving this stage's records
    pub fn collection(&self) -> &'static str {
        match self {
            Stage::RoleAssessment => "RoleAssessments",
            Stage::Solve => "Solutions",
            Stage::PeerReview => "SolutionReviews",
            Stage::Refine => "RefinedSolutions",
            Stage::Judge => "FinalJudgements",
        }
    }

    /// Directory receiving this stage's file artifacts
    pub fn artifact_dir(&self) -> &'static str {
        match self {
            Stage::RoleAssessment => "role_assessments",
            Stage::Solve => "solutions",
            Stage::PeerReview => "reviews",
            Stage::Refine => "refined_solutions",
            Stage::Judge => "final_judgements",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
