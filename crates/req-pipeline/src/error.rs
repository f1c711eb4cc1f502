//! Pipeline error types.

use thiserror::Error;

/// Errors from pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Database operation failed.
    #[error(transparent)]
    Db(#[from] req_db::error::DatabaseError),

    /// An agent call failed.
    #[error(transparent)]
    Agent(#[from] req_agents::AgentError),

    /// Embedding generation failed.
    #[error(transparent)]
    Embedding(#[from] req_embeddings::EmbeddingError),

    /// Writing run artifacts failed.
    #[error(transparent)]
    Export(#[from] req_export::ExportError),

    /// Run evidence file write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding of a bundle or audit record failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A cached artifact could not be decoded as a bundle.
    #[error("corrupt cache entry: {0}")]
    Cache(String),
}
