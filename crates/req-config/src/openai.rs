//! OpenAI-compatible API configuration.

use serde::{Deserialize, Serialize};

/// Default chat model.
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default API base URL.
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Default sampling temperature.
const fn default_temperature() -> f64 {
    0.2
}

/// Default request timeout in seconds.
const fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    /// API key. Also read from the bare `OPENAI_API_KEY` env var as a
    /// fallback, so existing shell setups keep working.
    #[serde(default)]
    pub api_key: String,

    /// Chat model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for the API (override for proxies or compatible servers).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature for generation calls.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OpenAiConfig {
    /// Check if the minimum required fields for API access are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
