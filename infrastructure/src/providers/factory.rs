//! Provider client factory
//!
//! Routes each agent to the adapter for its provider family. One client is
//! built per family and shared by every agent bound to it, so all of them
//! reuse the same connection pool.

use super::ProviderEndpoint;
use super::gemini::GeminiClient;
use super::openai::{JsonMode, OpenAiCompatibleClient};
use debate_application::{GatewayError, ProviderClient, ProviderFactory};
use debate_domain::{AgentConfig, ProviderKind};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

pub struct HttpProviderFactory {
    http: reqwest::Client,
    endpoints: HashMap<ProviderKind, ProviderEndpoint>,
    clients: Mutex<HashMap<ProviderKind, Arc<dyn ProviderClient>>>,
    env: Box<EnvLookup>,
}

impl HttpProviderFactory {
    /// Create a factory; families missing from `endpoints` use their defaults
    pub fn new(endpoints: HashMap<ProviderKind, ProviderEndpoint>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
            clients: Mutex::new(HashMap::new()),
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Resolve API keys through `lookup` instead of the process environment
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Box::new(lookup);
        self
    }

    fn endpoint(&self, kind: ProviderKind) -> ProviderEndpoint {
        self.endpoints
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| ProviderEndpoint::default_for(kind))
    }

    fn api_key(&self, kind: ProviderKind, endpoint: &ProviderEndpoint) -> Result<String, GatewayError> {
        endpoint
            .api_key
            .clone()
            .or_else(|| (self.env)(&endpoint.api_key_env))
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GatewayError::MissingApiKey {
                provider: kind,
                env_var: endpoint.api_key_env.clone(),
            })
    }

    fn build(&self, kind: ProviderKind) -> Result<Arc<dyn ProviderClient>, GatewayError> {
        let endpoint = self.endpoint(kind);
        let key = self.api_key(kind, &endpoint)?;
        info!(provider = %kind, base_url = %endpoint.base_url, "Provider client initialized");

        let client: Arc<dyn ProviderClient> = match kind {
            ProviderKind::OpenAi => Arc::new(OpenAiCompatibleClient::new(
                self.http.clone(),
                &endpoint,
                key,
                JsonMode::Schema,
            )),
            ProviderKind::DeepSeek => Arc::new(OpenAiCompatibleClient::new(
                self.http.clone(),
                &endpoint,
                key,
                JsonMode::Object,
            )),
            ProviderKind::Gemini => Arc::new(GeminiClient::new(self.http.clone(), &endpoint, key)),
        };
        Ok(client)
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn client_for(&self, agent: &AgentConfig) -> Result<Arc<dyn ProviderClient>, GatewayError> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| GatewayError::Configuration("provider client cache poisoned".into()))?;

        if let Some(client) = clients.get(&agent.provider) {
            debug!(agent = %agent.id, provider = %agent.provider, "Reusing provider client");
            return Ok(Arc::clone(client));
        }

        let client = self.build(agent.provider)?;
        clients.insert(agent.provider, Arc::clone(&client));
        Ok(client)
    }
}
