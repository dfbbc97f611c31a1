//! Provider configuration from TOML (`[providers]` section)

use crate::providers::ProviderEndpoint;
use debate_domain::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Overrides for one provider family; unset keys use the family defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderEndpoint {
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Direct API key (not recommended — use env var instead).
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: Option<String>,
}

/// Raw `[providers.*]` tables
///
/// ```toml
/// [providers.deepseek]
/// api_key_env = "DEEPSEEK_API_KEY"
/// base_url = "https://api.deepseek.com"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub openai: FileProviderEndpoint,
    pub deepseek: FileProviderEndpoint,
    pub gemini: FileProviderEndpoint,
}

impl FileProvidersConfig {
    /// Effective endpoint for `kind`
    pub fn endpoint(&self, kind: ProviderKind) -> ProviderEndpoint {
        let overrides = match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::DeepSeek => &self.deepseek,
            ProviderKind::Gemini => &self.gemini,
        };
        let mut endpoint = ProviderEndpoint::default_for(kind);
        if let Some(env) = &overrides.api_key_env {
            endpoint.api_key_env = env.clone();
        }
        if let Some(url) = &overrides.base_url {
            endpoint.base_url = url.trim_end_matches('/').to_string();
        }
        endpoint.api_key = overrides.api_key.clone();
        endpoint
    }

    /// Effective endpoints for every provider family
    pub fn endpoints(&self) -> HashMap<ProviderKind, ProviderEndpoint> {
        ProviderKind::all()
            .into_iter()
            .map(|kind| (kind, self.endpoint(kind)))
            .collect()
    }
}
