//! HTTP provider adapters
//!
//! Each adapter implements the application's `ProviderClient` port for one
//! wire protocol. [`HttpProviderFactory`] routes every agent to the adapter
//! for its provider family and shares one client per family.

pub mod error;
pub mod factory;
pub mod gemini;
pub mod openai;

pub use error::ProviderError;
pub use factory::HttpProviderFactory;
pub use gemini::GeminiClient;
pub use openai::OpenAiCompatibleClient;

use debate_domain::ProviderKind;

/// Where and how to reach one provider family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub api_key_env: String,
    /// Key given directly in configuration; takes precedence over the env var
    pub api_key: Option<String>,
}

impl ProviderEndpoint {
    pub fn default_for(kind: ProviderKind) -> Self {
        let (base_url, api_key_env) = match kind {
            ProviderKind::OpenAi => ("https://api.openai.com/v1", "OPENAI_API_KEY"),
            ProviderKind::DeepSeek => ("https://api.deepseek.com", "DEEPSEEK_API_KEY"),
            ProviderKind::Gemini => (
                "https://generativelanguage.googleapis.com/v1beta",
                "GOOGLE_API_KEY",
            ),
        };
        Self {
            base_url: base_url.to_string(),
            api_key_env: api_key_env.to_string(),
            api_key: None,
        }
    }
}
