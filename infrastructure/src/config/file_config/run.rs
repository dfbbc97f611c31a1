//! Run configuration from TOML (`[run]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw run configuration from TOML
///
/// # Example
///
/// ```toml
/// [run]
/// problems = "data/datasets/problems.json"
/// skip = 3
/// take = 1
/// output_dir = "data/output"
/// sessions = 2
/// strict_persistence = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunConfig {
    /// Problem dataset (JSON array)
    pub problems: PathBuf,
    /// Problems dropped from the front of the dataset
    pub skip: usize,
    /// Maximum number of problems after skipping (all when unset)
    pub take: Option<usize>,
    /// Root for JSONL collections and per-stage artifacts
    pub output_dir: PathBuf,
    /// Maximum concurrently running sessions
    pub sessions: usize,
    /// Fail a unit when its record cannot be persisted
    pub strict_persistence: bool,
}

impl Default for FileRunConfig {
    fn default() -> Self {
        Self {
            problems: PathBuf::from("data/datasets/problems.json"),
            skip: 0,
            take: None,
            output_dir: PathBuf::from("data/output"),
            sessions: 2,
            strict_persistence: false,
        }
    }
}
