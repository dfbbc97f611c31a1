//! Agents bound to provider clients
//!
//! An [`Agent`] pairs an immutable [`AgentConfig`] with the client that
//! serves it. Agents are built once per run and shared by every session;
//! a fatal provider error disables the agent for the rest of the run.

use crate::ports::provider::{GatewayError, ProviderClient, ProviderFactory, ProviderRequest};
use debate_domain::{AgentConfig, AgentId, PromptPair, StructuredOutput};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

pub struct Agent {
    config: AgentConfig,
    client: Arc<dyn ProviderClient>,
    disabled: OnceLock<String>,
}

impl Agent {
    pub fn new(config: AgentConfig, client: Arc<dyn ProviderClient>) -> Self {
        Self {
            config,
            client,
            disabled: OnceLock::new(),
        }
    }

    pub fn id(&self) -> &AgentId {
        &self.config.id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn client(&self) -> &dyn ProviderClient {
        self.client.as_ref()
    }

    /// Reason the agent was disabled, if it was
    pub fn disabled_reason(&self) -> Option<&str> {
        self.disabled.get().map(String::as_str)
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get().is_some()
    }

    /// Disable after a fatal error; the first reason wins
    pub fn disable(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.disabled.set(reason.clone()).is_ok() {
            warn!(agent = %self.config.id, "Agent disabled for the rest of the run: {}", reason);
        }
    }

    /// Build the provider request for one structured call
    pub fn request<T: StructuredOutput>(&self, prompts: &PromptPair) -> ProviderRequest {
        ProviderRequest {
            model: self.config.model.clone(),
            system_prompt: prompts.system.clone(),
            user_prompt: prompts.user.clone(),
            schema_name: T::SCHEMA_NAME,
            schema: <T as StructuredOutput>::json_schema(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        }
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("config", &self.config)
            .field("disabled", &self.disabled.get())
            .finish()
    }
}

/// The run's agents, in roster order
#[derive(Debug, Clone, Default)]
pub struct AgentRoster {
    agents: Vec<Arc<Agent>>,
}

impl AgentRoster {
    pub fn new(agents: Vec<Arc<Agent>>) -> Self {
        Self { agents }
    }

    /// Construct every agent through `factory`
    pub fn build(configs: &[AgentConfig], factory: &dyn ProviderFactory) -> Result<Self, GatewayError> {
        let mut agents = Vec::with_capacity(configs.len());
        for config in configs {
            let client = factory.client_for(config)?;
            info!(agent = %config.id, provider = %config.provider, model = %config.model, "Agent ready");
            agents.push(Arc::new(Agent::new(config.clone(), client)));
        }
        Ok(Self { agents })
    }

    pub fn get(&self, id: &AgentId) -> Option<&Arc<Agent>> {
        self.agents.iter().find(|a| a.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Agent>> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
