//! Export error types.

use thiserror::Error;

/// Errors from writing export artifacts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Filesystem write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Entity serialization failed.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
