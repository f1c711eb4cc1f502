//! Agentic pipeline tuning.

use serde::{Deserialize, Serialize};

/// Default maximum critique/refine iterations.
const fn default_max_iters() -> u32 {
    3
}

/// Default average quality score that ends the loop early.
const fn default_target_score() -> f64 {
    4.2
}

/// Default minimum iterations before early exit is allowed.
const fn default_force_min_iters() -> u32 {
    1
}

/// Default output directory for run bundles.
fn default_out_dir() -> String {
    "outputs".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Maximum critique/refine iterations after the initial generation.
    #[serde(default = "default_max_iters")]
    pub max_iters: u32,

    /// Average score at which the loop stops (when hard checks also pass).
    #[serde(default = "default_target_score")]
    pub target_score: f64,

    /// Minimum critique/refine iterations even when iteration 0 already
    /// meets the target.
    #[serde(default = "default_force_min_iters")]
    pub force_min_iters: u32,

    /// Output directory for exported run bundles.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_iters: default_max_iters(),
            target_score: default_target_score(),
            force_min_iters: default_force_min_iters(),
            out_dir: default_out_dir(),
        }
    }
}
