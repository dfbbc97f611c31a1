//! Output format value object

use serde::{Deserialize, Serialize};

/// How the run report is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per problem (default)
    #[default]
    Summary,
    /// Per-problem detail: roles, answers, winner, abort reasons
    Full,
    /// Machine-readable report
    Json,
}
