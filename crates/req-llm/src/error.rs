//! LLM client error types.

use thiserror::Error;

/// Errors that can occur when calling a chat completion API.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// The completion response had no usable content.
    #[error("empty completion: {0}")]
    EmptyCompletion(String),

    /// The model never produced JSON matching the expected shape, even
    /// after repair attempts.
    #[error("invalid JSON after {attempts} attempt(s): {message}")]
    InvalidJson {
        /// Total attempts made, including repairs.
        attempts: u32,
        /// Last deserialization error.
        message: String,
    },

    /// No API key is configured.
    #[error("no API key configured, set OPENAI_API_KEY or run in offline mode")]
    NotConfigured,
}
