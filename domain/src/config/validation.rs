//! Configuration validation results
//!
//! Validation never stops at the first problem: every check runs and the
//! caller receives the full list of [`ConfigIssue`]s. `Error` issues prevent
//! a run; `Warning` issues are reported and the run proceeds.

use crate::agent::AgentConfig;
use crate::roles::MIN_PARTICIPANTS;
use std::collections::HashSet;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work at all.
    Error,
    /// The configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// Two agents share an id.
    DuplicateAgentId,
    /// An agent has an empty id or model.
    IncompleteAgent,
    /// Fewer agents than one judge plus all solvers.
    RosterTooSmall,
    /// Provider name is not one of the supported families.
    UnknownProvider,
    /// Temperature or top_p outside its valid range.
    DecodingOutOfRange,
    /// A concurrency limit, timeout or retry count is zero.
    ZeroLimit,
    /// The roster is larger than needed and top-k preselection is off.
    UnusedAgents,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}

/// Check an agent roster for problems that would break role assignment
pub fn validate_roster(agents: &[AgentConfig]) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    if agents.len() < MIN_PARTICIPANTS {
        issues.push(ConfigIssue::error(
            ConfigIssueCode::RosterTooSmall,
            format!(
                "{} agent(s) configured, at least {} required (one judge and the solvers)",
                agents.len(),
                MIN_PARTICIPANTS
            ),
        ));
    }

    let mut seen = HashSet::new();
    for agent in agents {
        if !seen.insert(agent.id.as_str()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateAgentId,
                format!("agent id '{}' is used more than once", agent.id),
            ));
        }
        if let Err(e) = agent.validate() {
            let code = if agent.id.as_str().trim().is_empty() || agent.model.trim().is_empty() {
                ConfigIssueCode::IncompleteAgent
            } else {
                ConfigIssueCode::DecodingOutOfRange
            };
            issues.push(ConfigIssue::error(code, e.to_string()));
        }
    }

    issues
}
