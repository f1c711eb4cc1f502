//! Semantic cache policy (`cache_policy_v1`).
//!
//! Lookup order for a generation request:
//!
//! 1. Exact hit: SHA-256 of the normalized cache input matches a stored
//!    requirement. The cached bundle is returned as-is.
//! 2. Nearest neighbor over stored embeddings. At or above the reuse
//!    threshold the cached bundle is returned verbatim; inside the adapt
//!    band it seeds an adapted generation; below the band it is a miss.
//! 3. Miss: fresh generation.
//!
//! Adapted and fresh bundles are stored under the new epic's hash so later
//! requests can hit them. A requirement keeps its first stored bundle.

use req_agents::{GeneratedBundle, adapt_bundle, generate_bundle};
use req_config::CacheConfig;
use req_core::entities::Epic;
use req_core::enums::CacheOutcome;
use req_db::ReqDb;
use req_db::helpers::sha256_hex;
use req_embeddings::Embedder;
use req_llm::Completion;
use serde::Serialize;

use crate::error::PipelineError;

/// Version tag recorded with every cache decision.
pub const POLICY_VERSION: &str = "cache_policy_v1";

/// Artifact type stored for generated bundles.
const OUTPUT_TYPE: &str = "requirements_bundle";

/// How one generation request resolved against the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheMeta {
    pub cache_hit: CacheOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_requirement_id: Option<i64>,
    pub policy_version: &'static str,
    pub user_message: String,
}

impl CacheMeta {
    fn new(
        cache_hit: CacheOutcome,
        similarity: Option<f64>,
        source_requirement_id: Option<i64>,
    ) -> Self {
        Self {
            cache_hit,
            similarity,
            source_requirement_id,
            policy_version: POLICY_VERSION,
            user_message: user_message(cache_hit, similarity),
        }
    }
}

/// Lowercase and collapse all whitespace runs to single spaces.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The text the cache keys on: epic ID, text, constraints, and glossary.
///
/// Constraints and glossary are part of the key so a changed constraint
/// never serves a stale bundle.
#[must_use]
pub fn cache_input(epic: &Epic) -> String {
    format!(
        "Epic ID: {}\n\n{}\n\nConstraints:\n{}\n\nGlossary:\n{}",
        epic.epic_id,
        epic.text,
        req_agents::prompts::format_constraints(epic),
        req_agents::prompts::format_glossary(epic),
    )
}

fn user_message(cache_hit: CacheOutcome, similarity: Option<f64>) -> String {
    let sim = similarity.unwrap_or_default();
    match cache_hit {
        CacheOutcome::Hash => {
            "Exact match found. Reusing cached bundle to save time and cost.".to_string()
        }
        CacheOutcome::SemanticReuse => {
            format!("Found a very close match (similarity {sim:.2}). Reusing a previous bundle.")
        }
        CacheOutcome::SemanticAdapt => format!(
            "Found a similar epic (similarity {sim:.2}). Adapting a previous bundle to fit this epic."
        ),
        CacheOutcome::Miss => {
            "No close match found. Generating a fresh bundle for best fit.".to_string()
        }
    }
}

fn decode_bundle(content: &serde_json::Value) -> Result<GeneratedBundle, PipelineError> {
    serde_json::from_value(content.clone())
        .map_err(|e| PipelineError::Cache(format!("stored bundle does not parse: {e}")))
}

/// Generate a bundle for an epic, consulting the semantic cache first.
///
/// With the cache disabled this is a plain fresh generation and nothing
/// is stored.
///
/// # Errors
///
/// Returns [`PipelineError`] on agent, embedding, or database failure, or
/// when a stored bundle no longer parses.
pub async fn generate_bundle_cached<C: Completion, E: Embedder>(
    llm: &C,
    embedder: &mut E,
    db: &ReqDb,
    epic: &Epic,
    model: &str,
    cfg: &CacheConfig,
) -> Result<(GeneratedBundle, CacheMeta), PipelineError> {
    if !cfg.enabled {
        let bundle = generate_bundle(llm, epic).await?;
        let mut meta = CacheMeta::new(CacheOutcome::Miss, None, None);
        meta.user_message = "Semantic cache disabled. Generating a fresh bundle.".to_string();
        return Ok((bundle, meta));
    }

    let raw = cache_input(epic);
    let norm = normalize(&raw);
    let hash = sha256_hex(&norm);

    if let Some(artifact) = db.get_cached_by_hash(&hash).await? {
        tracing::info!(epic_id = %epic.epic_id, "exact cache hit");
        let bundle = decode_bundle(&artifact.content)?;
        return Ok((bundle, CacheMeta::new(CacheOutcome::Hash, None, None)));
    }

    let embedding = embedder.embed(&norm)?;

    if let Some((source_id, similarity)) = db.nearest_cached_requirement(&embedding).await? {
        if similarity >= cfg.adapt_threshold {
            // A requirement row can exist without a stored bundle; that is
            // a miss, not an error.
            if let Some(artifact) = db.get_artifact_for(source_id).await? {
                if similarity >= cfg.reuse_threshold {
                    tracing::info!(
                        epic_id = %epic.epic_id,
                        similarity,
                        source_id,
                        "semantic reuse"
                    );
                    let bundle = decode_bundle(&artifact.content)?;
                    let meta = CacheMeta::new(
                        CacheOutcome::SemanticReuse,
                        Some(similarity),
                        Some(source_id),
                    );
                    return Ok((bundle, meta));
                }

                tracing::info!(
                    epic_id = %epic.epic_id,
                    similarity,
                    source_id,
                    "semantic adapt"
                );
                let adapted = adapt_bundle(llm, epic, &artifact.content, similarity).await?;
                let meta = CacheMeta::new(
                    CacheOutcome::SemanticAdapt,
                    Some(similarity),
                    Some(source_id),
                );

                let req_id = db
                    .ensure_cached_requirement(&raw, &norm, &hash, Some(&embedding))
                    .await?;
                db.store_cached_artifact(
                    req_id,
                    OUTPUT_TYPE,
                    &serde_json::to_value(&adapted)?,
                    model,
                    "v1_adapt",
                    &serde_json::to_value(&meta)?,
                )
                .await?;

                return Ok((adapted, meta));
            }
        }
    }

    let bundle = generate_bundle(llm, epic).await?;
    let meta = CacheMeta::new(CacheOutcome::Miss, None, None);

    let req_id = db
        .ensure_cached_requirement(&raw, &norm, &hash, Some(&embedding))
        .await?;
    db.store_cached_artifact(
        req_id,
        OUTPUT_TYPE,
        &serde_json::to_value(&bundle)?,
        model,
        "v1",
        &serde_json::to_value(&meta)?,
    )
    .await?;

    Ok((bundle, meta))
}
