//! Application layer for llm-debate
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod agent;
pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use agent::{Agent, AgentRoster};
pub use config::{CallPolicy, ConcurrencyLimits, ExecutionParams};
pub use ports::{
    document_store::{ArtifactSink, DocumentStore, NoArtifacts, NoDocumentStore, StoreError},
    progress::{DebateProgressNotifier, NoProgress},
    provider::{GatewayError, ProviderClient, ProviderFactory, ProviderOutcome, ProviderRequest},
};
pub use use_cases::call_executor::{CallError, CallExecutor};
pub use use_cases::debate_session::{DebateSession, SessionError, SessionServices};
pub use use_cases::run_debate::{RunDebateError, RunDebateInput, RunDebateUseCase};
pub use use_cases::stage_coordinator::{StageCoordinator, UnitError};
