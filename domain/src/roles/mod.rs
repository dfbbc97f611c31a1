//! Roles domain module
//!
//! Judge and solver roles, and the policy that assigns them from
//! self-assessment scores.

pub mod assignment;
pub mod role;

pub use assignment::{AssignmentPolicy, RoleAssignment, ScoreCard, assign_roles};
pub use role::{MIN_PARTICIPANTS, Role, SOLVER_COUNT, SolverSlot};
