//! # req-embeddings
//!
//! Local embedding generation for ReqSmith using fastembed (ONNX runtime).
//!
//! Generates 384-dimensional vectors for normalized epic text so the semantic
//! cache can find near-duplicate epics without any external API key.
//!
//! ## Model
//!
//! Uses [`AllMiniLML6V2`](fastembed::EmbeddingModel::AllMiniLML6V2)
//! (sentence-transformers/all-MiniLM-L6-v2):
//! - 384-dimensional output vectors
//! - Mean pooling (no query/passage prefix needed)
//! - ~80MB model size, cached at `~/.reqsmith/cache/fastembed/`
//!
//! ## Async usage
//!
//! The fastembed ONNX runtime is synchronous. When calling from async code,
//! wrap calls in [`tokio::task::spawn_blocking`].

pub mod error;

pub use error::EmbeddingError;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

/// Local embedding engine backed by fastembed (ONNX runtime).
///
/// Wraps the `AllMiniLML6V2` model to produce 384-dimensional float vectors.
/// Model files are downloaded on first use and cached at
/// `~/.reqsmith/cache/fastembed/`.
///
/// # Thread safety
///
/// [`TextEmbedding::embed`] requires `&mut self`. To use from multiple
/// threads, wrap in a `Mutex` or create one engine per thread. From async
/// code, prefer [`tokio::task::spawn_blocking`] with a moved engine.
pub struct EmbeddingEngine {
    model: TextEmbedding,
}

impl EmbeddingEngine {
    /// Create a new embedding engine with the `AllMiniLML6V2` model.
    ///
    /// Downloads the model on first run (~80MB) to `~/.reqsmith/cache/fastembed/`.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if model download or ONNX
    /// initialization fails.
    pub fn new() -> Result<Self, EmbeddingError> {
        let cache_dir = dirs::home_dir().map_or_else(
            || std::path::PathBuf::from(".fastembed_cache"),
            |h| h.join(".reqsmith").join("cache").join("fastembed"),
        );

        tracing::info!(cache_dir = %cache_dir.display(), "loading AllMiniLML6V2 embedding model");
        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self { model })
    }

    /// Embed a batch of texts. Returns one 384-dim vector per input.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if the ONNX inference fails.
    pub fn embed_batch(&mut self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))
    }

    /// Embed a single text. Returns a 384-dim vector.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if inference fails, or
    /// [`EmbeddingError::EmptyResult`] if the model returns no embeddings.
    pub fn embed_single(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut results = self.embed_batch(vec![text.to_string()])?;
        results.pop().ok_or(EmbeddingError::EmptyResult)
    }

    /// Embedding vector dimensionality (always 384 for `AllMiniLML6V2`).
    #[must_use]
    pub const fn dimension() -> usize {
        384
    }
}

/// Anything that can turn text into a vector.
///
/// The pipeline is generic over this so tests can substitute a cheap
/// deterministic embedder for the ONNX model.
pub trait Embedder {
    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError`] if inference fails.
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

impl Embedder for EmbeddingEngine {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_single(text)
    }
}

/// Cosine similarity between two vectors. Returns 0.0 for zero-norm inputs.
///
/// The cache's brute-force nearest-neighbor scan uses this on stored
/// embeddings; mismatched lengths count as dissimilar rather than panicking.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
