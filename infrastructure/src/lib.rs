//! Infrastructure layer for llm-debate
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: HTTP provider clients, file-backed persistence,
//! dataset loading and configuration file loading.

pub mod config;
pub mod dataset;
pub mod persistence;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentConfig, FileCallConfig, FileConfig,
    FileOutputConfig, FileOutputFormat, FileProviderEndpoint, FileProvidersConfig, FileRunConfig,
    FileStageConfig,
};
pub use dataset::{DatasetError, load_problems};
pub use persistence::{FileArtifactWriter, JsonlDocumentStore};
pub use providers::{
    GeminiClient, HttpProviderFactory, OpenAiCompatibleClient, ProviderEndpoint, ProviderError,
};
