//! Agent error types.

use thiserror::Error;

/// Errors from agent calls.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The underlying completion call failed.
    #[error(transparent)]
    Llm(#[from] req_llm::error::LlmError),

    /// The model's output parsed but failed a structural check.
    #[error("invalid agent output: {0}")]
    Invalid(String),
}
