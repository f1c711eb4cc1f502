//! Semantic cache configuration.

use serde::{Deserialize, Serialize};

/// Similarity at or above which a cached bundle is reused verbatim.
const fn default_reuse_threshold() -> f64 {
    0.92
}

/// Similarity at or above which a cached bundle seeds an adapted generation.
const fn default_adapt_threshold() -> f64 {
    0.75
}

/// Default database path, relative to the project root.
fn default_db_path() -> String {
    ".reqsmith/reqsmith.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Whether the semantic cache is consulted at all.
    #[serde(default = "crate::cache::default_enabled")]
    pub enabled: bool,

    /// Path to the libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Reuse band lower bound (inclusive).
    #[serde(default = "default_reuse_threshold")]
    pub reuse_threshold: f64,

    /// Adapt band lower bound (inclusive). Must not exceed `reuse_threshold`.
    #[serde(default = "default_adapt_threshold")]
    pub adapt_threshold: f64,
}

pub(crate) const fn default_enabled() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            db_path: default_db_path(),
            reuse_threshold: default_reuse_threshold(),
            adapt_threshold: default_adapt_threshold(),
        }
    }
}

impl CacheConfig {
    /// Validate the threshold ordering.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the adapt threshold exceeds the
    /// reuse threshold or either falls outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        for (field, value) in [
            ("cache.reuse_threshold", self.reuse_threshold),
            ("cache.adapt_threshold", self.adapt_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        if self.adapt_threshold > self.reuse_threshold {
            return Err(crate::ConfigError::InvalidValue {
                field: "cache.adapt_threshold".to_string(),
                reason: format!(
                    "adapt threshold {} exceeds reuse threshold {}",
                    self.adapt_threshold, self.reuse_threshold
                ),
            });
        }
        Ok(())
    }
}
