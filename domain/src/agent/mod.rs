//! Agent domain module
//!
//! An agent is a bound identity plus decoding parameters used to issue
//! calls to one external provider.

pub mod config;

pub use config::{AgentConfig, AgentId, ProviderKind};
