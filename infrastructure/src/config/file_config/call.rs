//! Call supervision and stage settings from TOML (`[call]` and `[stage]` sections)

use debate_application::CallPolicy;
use debate_domain::AssignmentPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw call supervision settings
///
/// # Example
///
/// ```toml
/// [call]
/// timeout_secs = 2000
/// heartbeat_secs = 10
/// post_call_delay_secs = 5
/// max_retries = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCallConfig {
    /// Per-attempt timeout
    pub timeout_secs: u64,
    /// Progress heartbeat period while a call is in flight (0 disables)
    pub heartbeat_secs: u64,
    /// Cool-down after every call, successful or not
    pub post_call_delay_secs: u64,
    /// Total attempts per call, including the first
    pub max_retries: u32,
}

impl Default for FileCallConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 2000,
            heartbeat_secs: 10,
            post_call_delay_secs: 5,
            max_retries: 3,
        }
    }
}

impl FileCallConfig {
    pub fn to_call_policy(&self) -> CallPolicy {
        CallPolicy::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_heartbeat_interval(Duration::from_secs(self.heartbeat_secs))
            .with_post_call_delay(Duration::from_secs(self.post_call_delay_secs))
            .with_max_retries(self.max_retries)
    }
}

/// Raw stage settings
///
/// ```toml
/// [stage]
/// unit_limit = 4
/// preselect_top_k = true
/// weighted_preference = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStageConfig {
    /// Maximum concurrently running units within one stage
    pub unit_limit: usize,
    /// Keep only the four most capable agents before ranking
    pub preselect_top_k: bool,
    /// Weight judge preference by its magnitude
    pub weighted_preference: bool,
}

impl Default for FileStageConfig {
    fn default() -> Self {
        Self {
            unit_limit: 4,
            preselect_top_k: true,
            weighted_preference: true,
        }
    }
}

impl FileStageConfig {
    pub fn to_assignment_policy(&self) -> AssignmentPolicy {
        AssignmentPolicy {
            preselect_top_k: self.preselect_top_k,
            weighted_preference: self.weighted_preference,
        }
    }
}
