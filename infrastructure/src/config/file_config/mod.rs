//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod call;
mod output;
mod providers;
mod run;

pub use agent::FileAgentConfig;
pub use call::{FileCallConfig, FileStageConfig};
pub use output::{FileOutputConfig, FileOutputFormat};
pub use providers::{FileProviderEndpoint, FileProvidersConfig};
pub use run::FileRunConfig;

use debate_application::{ConcurrencyLimits, ExecutionParams};
use debate_domain::{
    AgentConfig, ConfigIssue, ConfigIssueCode, MIN_PARTICIPANTS, validate_roster,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration that cannot be turned into a run
#[derive(Debug, Error)]
#[error("invalid configuration: {summary}")]
pub struct ConfigValidationError {
    pub issues: Vec<ConfigIssue>,
    summary: String,
}

impl ConfigValidationError {
    pub fn new(issues: Vec<ConfigIssue>) -> Self {
        let summary = issues
            .iter()
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self { issues, summary }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Problem source, output location and session settings
    pub run: FileRunConfig,
    /// Per-call timeout, heartbeat, cool-down and retries
    pub call: FileCallConfig,
    /// Stage concurrency and role assignment tuning
    pub stage: FileStageConfig,
    /// Agent roster, in tie-break order
    pub agents: Vec<FileAgentConfig>,
    /// Provider endpoints and credentials
    pub providers: FileProvidersConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            run: FileRunConfig::default(),
            call: FileCallConfig::default(),
            stage: FileStageConfig::default(),
            agents: FileAgentConfig::default_roster(),
            providers: FileProvidersConfig::default(),
            output: FileOutputConfig::default(),
        }
    }
}

impl FileConfig {
    /// Parse the roster, collecting one issue per unparseable entry
    pub fn parse_agents(&self) -> (Vec<AgentConfig>, Vec<ConfigIssue>) {
        let mut agents = Vec::with_capacity(self.agents.len());
        let mut issues = Vec::new();
        for entry in &self.agents {
            match entry.parse() {
                Ok(agent) => agents.push(agent),
                Err(issue) => issues.push(issue),
            }
        }
        (agents, issues)
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Provider names of every agent
    /// 2. The roster itself (size, duplicate ids, decoding ranges)
    /// 3. Limits that would stall or disable the run when zero
    /// 4. Agents that can never receive a role
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (agents, mut issues) = self.parse_agents();

        if issues.is_empty() {
            issues.extend(validate_roster(&agents));
        }

        let limits = [
            ("run.sessions", self.run.sessions as u64),
            ("stage.unit_limit", self.stage.unit_limit as u64),
            ("call.timeout_secs", self.call.timeout_secs),
            ("call.max_retries", u64::from(self.call.max_retries)),
        ];
        for (field, value) in limits {
            if value == 0 {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::ZeroLimit,
                    format!("{} must be at least 1", field),
                ));
            }
        }

        if self.agents.len() > MIN_PARTICIPANTS && !self.stage.preselect_top_k {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnusedAgents,
                format!(
                    "{} agents configured but only {} take part; enable stage.preselect_top_k \
                     to pick them by capability",
                    self.agents.len(),
                    MIN_PARTICIPANTS
                ),
            ));
        }

        issues
    }

    /// Validate and return the roster, or every error found
    pub fn agent_configs(&self) -> Result<Vec<AgentConfig>, ConfigValidationError> {
        let errors: Vec<ConfigIssue> = self.validate().into_iter().filter(|i| i.is_error()).collect();
        if !errors.is_empty() {
            return Err(ConfigValidationError::new(errors));
        }
        Ok(self.parse_agents().0)
    }

    /// Execution parameters for the application layer
    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams {
            call: self.call.to_call_policy(),
            limits: ConcurrencyLimits {
                stage_units: self.stage.unit_limit.max(1),
                sessions: self.run.sessions.max(1),
            },
            assignment: self.stage.to_assignment_policy(),
            strict_persistence: self.run.strict_persistence,
        }
    }
}
