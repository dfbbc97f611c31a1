//! Domain layer for llm-debate
//!
//! This crate contains the core debate model: problems, agents, roles,
//! stage outputs and records, and the per-session state machine. It has
//! no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Debate
//!
//! One debate session runs a fixed protocol for a single problem:
//!
//! 1. **Role assessment**: every agent scores its fit for judging and solving
//! 2. **Solve**: three solvers answer independently
//! 3. **Peer review**: every solver reviews every other solver
//! 4. **Refine**: each reviewed solver revises its answer
//! 5. **Judge**: the judge picks one winning refined solution
//!
//! ## Roles
//!
//! [`assign_roles`] turns self-assessment scores into exactly one judge and
//! three solvers, deterministically.

pub mod agent;
pub mod config;
pub mod core;
pub mod debate;
pub mod orchestration;
pub mod prompt;
pub mod roles;

// Re-export commonly used types
pub use agent::{AgentConfig, AgentId, ProviderKind};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity, validate_roster};
pub use core::{
    error::DomainError,
    problem::{Problem, ProblemBrief, ProblemSet},
};
pub use debate::{
    CritiqueResolution, ErrorType, Judgment, JudgmentOutput, PeerEvaluation, RecordMeta,
    RefinedSolution, RefinementOutput, Review, ReviewFinding, ReviewOutput, RoleAssessment,
    RoleAssessmentOutput, Solution, SolutionOutput, StructuredOutput, Verdict,
};
pub use orchestration::{
    JudgmentInput, PeerReviewInput, RefinementInput, RunReport, SessionOutcome, SessionReport,
    SessionState, SolverBrief, SolverContext, SolverPanel, Stage, UnitFailure,
};
pub use prompt::{DebatePrompts, PromptPair};
pub use roles::{
    AssignmentPolicy, MIN_PARTICIPANTS, Role, RoleAssignment, SOLVER_COUNT, ScoreCard,
    SolverSlot, assign_roles,
};
