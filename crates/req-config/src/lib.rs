//! # req-config
//!
//! Layered configuration loading for ReqSmith using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`REQSMITH_*` prefix, `__` as separator)
//! 2. Project-level `.reqsmith/config.toml`
//! 3. User-level `~/.config/reqsmith/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `REQSMITH_OPENAI__API_KEY` -> `openai.api_key`,
//! `REQSMITH_CACHE__REUSE_THRESHOLD` -> `cache.reuse_threshold`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! The bare `OPENAI_API_KEY` and `OPENAI_MODEL` variables are honored as a
//! fallback so shells already exporting them keep working.

mod cache;
mod error;
mod openai;
mod pipeline;

pub use cache::CacheConfig;
pub use error::ConfigError;
pub use openai::OpenAiConfig;
pub use pipeline::PipelineConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReqConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl ReqConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or the cache thresholds are
    /// inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.cache.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// Calls `dotenvy` to load the `.env` file from the working directory
    /// before building the figment. This is the typical entry point for the
    /// CLI.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add additional
    /// providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".reqsmith/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Bare OpenAI env vars (compat fallback)
        figment = figment
            .merge(Env::raw().only(&["OPENAI_API_KEY"]).map(|_| "openai.api_key".into()))
            .merge(Env::raw().only(&["OPENAI_MODEL"]).map(|_| "openai.model".into()));

        // Layer 4: Prefixed environment variables (highest priority)
        figment.merge(Env::prefixed("REQSMITH_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reqsmith").join("config.toml"))
    }
}
