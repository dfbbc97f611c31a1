//! Debate orchestration domain
//!
//! Stages, the per-session state machine, the per-solver contexts the
//! stages read from and write to, and the run/session reports.

pub mod context;
pub mod stage;
pub mod state;
pub mod value_objects;

pub use context::{
    JudgmentInput, PeerReviewInput, RefinementInput, SolverBrief, SolverContext, SolverPanel,
};
pub use stage::Stage;
pub use state::SessionState;
pub use value_objects::{RunReport, SessionOutcome, SessionReport, UnitFailure};
