//! Debate roles
//!
//! Roles are a closed set: one [`Role::Judge`] and a fixed number of
//! [`Role::Solver`] slots. The slot labels ("Solver 1", "Solver 2", ...)
//! are what the judge uses to name the winner, so they double as the
//! wire format of the judgment's winner field.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of solvers in every debate
pub const SOLVER_COUNT: usize = 3;

/// Judge plus solvers
pub const MIN_PARTICIPANTS: usize = SOLVER_COUNT + 1;

/// Position of a solver within a debate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum SolverSlot {
    #[serde(rename = "Solver 1")]
    One,
    #[serde(rename = "Solver 2")]
    Two,
    #[serde(rename = "Solver 3")]
    Three,
}

impl SolverSlot {
    pub const ALL: [SolverSlot; SOLVER_COUNT] = [SolverSlot::One, SolverSlot::Two, SolverSlot::Three];

    /// Zero-based position
    pub fn index(self) -> usize {
        match self {
            SolverSlot::One => 0,
            SolverSlot::Two => 1,
            SolverSlot::Three => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            SolverSlot::One => "Solver 1",
            SolverSlot::Two => "Solver 2",
            SolverSlot::Three => "Solver 3",
        }
    }
}

impl std::fmt::Display for SolverSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Role of an agent within one debate session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Judge,
    Solver(SolverSlot),
}

impl Role {
    pub fn is_judge(&self) -> bool {
        matches!(self, Role::Judge)
    }

    pub fn solver_slot(&self) -> Option<SolverSlot> {
        match self {
            Role::Judge => None,
            Role::Solver(slot) => Some(*slot),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Judge => f.write_str("Judge"),
            Role::Solver(slot) => write!(f, "{}", slot),
        }
    }
}
