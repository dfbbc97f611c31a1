//! Agent roster from TOML (`[[agents]]` array)

use debate_domain::{AgentConfig, AgentId, ConfigIssue, ConfigIssueCode, ProviderKind};
use serde::{Deserialize, Serialize};

/// Raw agent entry from TOML
///
/// # Example
///
/// ```toml
/// [[agents]]
/// id = "pro_conservative"
/// provider = "gemini"
/// model = "gemini-3-pro-preview"
/// temperature = 0.2
/// top_p = 0.85
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAgentConfig {
    pub id: String,
    /// "openai", "deepseek" or "gemini"
    #[serde(default = "default_provider")]
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

fn default_provider() -> String {
    ProviderKind::Gemini.as_str().to_string()
}

impl FileAgentConfig {
    fn gemini(id: &str, model: &str, temperature: f64, top_p: f64) -> Self {
        Self {
            id: id.to_string(),
            provider: default_provider(),
            model: model.to_string(),
            temperature: Some(temperature),
            top_p: Some(top_p),
        }
    }

    /// Built-in roster: two Gemini Pro and two Gemini Flash agents with
    /// different sampling temperaments
    pub fn default_roster() -> Vec<Self> {
        vec![
            Self::gemini("pro_conservative", "gemini-3-pro-preview", 0.2, 0.85),
            Self::gemini("pro_exploratory", "gemini-3-pro-preview", 0.5, 0.9),
            Self::gemini("flash_low_var", "gemini-3-flash-preview", 0.3, 0.85),
            Self::gemini("flash_high_var", "gemini-3-flash-preview", 0.7, 0.95),
        ]
    }

    /// Parse into a domain agent config, reporting an unknown provider
    pub fn parse(&self) -> Result<AgentConfig, ConfigIssue> {
        let provider = self.provider.parse::<ProviderKind>().map_err(|_| {
            ConfigIssue::error(
                ConfigIssueCode::UnknownProvider,
                format!(
                    "agents.{}: unknown provider '{}' (expected one of: {})",
                    self.id,
                    self.provider,
                    ProviderKind::all().map(|p| p.as_str()).join(", ")
                ),
            )
        })?;
        Ok(AgentConfig {
            id: AgentId::new(self.id.clone()),
            provider,
            model: self.model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
        })
    }
}
