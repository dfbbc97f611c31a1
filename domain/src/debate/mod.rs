//! Debate artifacts
//!
//! [`output`] holds what models return at each stage; [`record`] wraps
//! those outputs with run/problem/agent bookkeeping.

pub mod output;
pub mod record;

pub use output::{
    CritiqueResolution, ErrorType, JudgmentOutput, PeerEvaluation, RefinementOutput,
    ReviewFinding, ReviewOutput, RoleAssessmentOutput, Severity, SolutionOutput,
    StructuredOutput, Verdict,
};
pub use record::{RecordMeta, RefinedSolution, Review, RoleAssessment, Judgment, Solution};
