//! Provider port
//!
//! Defines the interface for submitting one structured call to an LLM
//! provider, and for building provider clients from agent configuration.

use async_trait::async_trait;
use debate_domain::{AgentConfig, ProviderKind};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Substrings that mark a provider error as fatal (quota/billing exhaustion)
pub const FATAL_KEYWORDS: [&str; 4] = ["insufficient", "quota", "billing", "credits"];

/// Whether an error message describes a non-retryable provider failure
pub fn is_fatal_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    FATAL_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// One structured call as seen by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub schema_name: &'static str,
    pub schema: Value,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

/// Result of one provider call
///
/// Providers never raise: every failure is classified here so the retry
/// loop can decide without inspecting error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    /// Parsed JSON object returned by the model
    Ok(Value),
    /// Worth another attempt
    Retryable(String),
    /// Must not be retried; disables the agent
    Fatal(String),
}

impl ProviderOutcome {
    /// Classify a provider error message by the fatal keyword set
    pub fn from_error_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_fatal_message(&message) {
            ProviderOutcome::Fatal(message)
        } else {
            ProviderOutcome::Retryable(message)
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProviderOutcome::Ok(_))
    }
}

/// Client for one provider, shared by every agent bound to it
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn submit(&self, request: &ProviderRequest) -> ProviderOutcome;
}

/// Errors raised while constructing provider clients
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("API key for {provider} not found (set {env_var})")]
    MissingApiKey {
        provider: ProviderKind,
        env_var: String,
    },

    #[error("Provider configuration error: {0}")]
    Configuration(String),
}

/// Builds provider clients from agent configuration
///
/// Constructed once per run and handed to the use case.
pub trait ProviderFactory: Send + Sync {
    fn client_for(&self, agent: &AgentConfig) -> Result<Arc<dyn ProviderClient>, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_keywords_case_insensitive() {
        assert!(is_fatal_message("Error 429: You exceeded your current QUOTA"));
        assert!(is_fatal_message("Insufficient Balance"));
        assert!(is_fatal_message("billing hard limit reached"));
        assert!(is_fatal_message("out of credits"));
        assert!(!is_fatal_message("connection reset by peer"));
    }

    #[test]
    fn test_outcome_classification() {
        assert!(matches!(
            ProviderOutcome::from_error_message("insufficient_quota"),
            ProviderOutcome::Fatal(_)
        ));
        assert!(matches!(
            ProviderOutcome::from_error_message("503 Service Unavailable"),
            ProviderOutcome::Retryable(_)
        ));
    }
}
