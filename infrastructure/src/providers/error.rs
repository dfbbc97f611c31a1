//! Provider adapter errors and their retry classification

use debate_application::ProviderOutcome;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Model refused the request: {0}")]
    Refusal(String),
}

impl ProviderError {
    /// Map onto the retry contract: payment required and quota/billing
    /// messages are fatal, everything else may be retried.
    ///
    /// Only transport and status errors are keyword-classified. Refusals and
    /// malformed output carry text the model wrote, which must never disable
    /// an agent.
    pub fn into_outcome(self) -> ProviderOutcome {
        match self {
            ProviderError::Status { status: 402, .. } => ProviderOutcome::Fatal(self.to_string()),
            ProviderError::Status { .. } | ProviderError::Http(_) => {
                ProviderOutcome::from_error_message(self.to_string())
            }
            ProviderError::MalformedResponse(_) | ProviderError::Refusal(_) => {
                ProviderOutcome::Retryable(self.to_string())
            }
        }
    }
}

/// Parse the JSON document a model returned as text
pub(crate) fn parse_model_json(text: &str) -> Result<serde_json::Value, ProviderError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).map_err(|e| {
        ProviderError::MalformedResponse(format!("model output is not valid JSON: {}", e))
    })
}
