//! Configuration file loading for llm-debate
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DEBATE_*` environment variables (nested keys split on `__`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./debate.toml` or `./.debate.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/llm-debate/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileCallConfig, FileConfig, FileOutputConfig,
    FileOutputFormat, FileProviderEndpoint, FileProvidersConfig, FileRunConfig, FileStageConfig,
};
pub use loader::ConfigLoader;
