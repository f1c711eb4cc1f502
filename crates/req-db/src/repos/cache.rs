//! Semantic cache repository.
//!
//! Two-level lookup: an exact hit by SHA-256 of the normalized epic text,
//! then a nearest-neighbor scan over stored embeddings. The scan is a
//! brute-force cosine pass over every cached requirement, which is fine at
//! the row counts a requirements cache sees.

use req_embeddings::cosine_similarity;
use serde_json::Value;

use crate::ReqDb;
use crate::error::DatabaseError;
use crate::helpers::{decode_embedding, encode_embedding};

/// A cached generation attached to a requirement row.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedArtifact {
    pub requirement_id: i64,
    pub output_type: String,
    pub content: Value,
    pub model: String,
    pub prompt_version: String,
}

impl ReqDb {
    /// Insert or fetch the cache row for a normalized requirement text.
    ///
    /// Returns the row ID. An existing row keeps its stored embedding; a
    /// new row stores the one passed in.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT or lookup fails.
    pub async fn ensure_cached_requirement(
        &self,
        raw_text: &str,
        normalized_text: &str,
        text_hash: &str,
        embedding: Option<&[f32]>,
    ) -> Result<i64, DatabaseError> {
        let embedding_json = match embedding {
            Some(v) => Some(encode_embedding(v)?),
            None => None,
        };

        self.conn()
            .execute(
                "INSERT INTO cached_requirements (raw_text, normalized_text, text_hash, embedding_json)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(text_hash) DO NOTHING",
                libsql::params![raw_text, normalized_text, text_hash, embedding_json],
            )
            .await?;

        let mut rows = self
            .conn()
            .query(
                "SELECT id FROM cached_requirements WHERE text_hash = ?1",
                [text_hash],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    /// Exact cache lookup by normalized-text hash.
    ///
    /// Returns the newest artifact for the matching requirement row, or
    /// `None` if the text has never been cached (or was cached without a
    /// generation attached).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_cached_by_hash(
        &self,
        text_hash: &str,
    ) -> Result<Option<CachedArtifact>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id FROM cached_requirements WHERE text_hash = ?1",
                [text_hash],
            )
            .await?;
        match rows.next().await? {
            Some(row) => self.get_artifact_for(row.get::<i64>(0)?).await,
            None => Ok(None),
        }
    }

    /// Newest artifact attached to a cached requirement row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_artifact_for(
        &self,
        requirement_id: i64,
    ) -> Result<Option<CachedArtifact>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT requirement_id, output_type, content_json, model, prompt_version
                 FROM cached_artifacts WHERE requirement_id = ?1
                 ORDER BY id DESC LIMIT 1",
                [requirement_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_artifact(&row)?)),
            None => Ok(None),
        }
    }

    /// Nearest cached requirement by cosine similarity to the query vector.
    ///
    /// Brute-force scan over all rows that carry an embedding. Returns the
    /// best `(requirement_id, similarity)`, or `None` when the cache is
    /// empty. Threshold policy (reuse vs adapt vs miss) is the caller's.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query or vector decoding fails.
    pub async fn nearest_cached_requirement(
        &self,
        query: &[f32],
    ) -> Result<Option<(i64, f64)>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, embedding_json FROM cached_requirements
                 WHERE embedding_json IS NOT NULL",
                (),
            )
            .await?;

        let mut best: Option<(i64, f64)> = None;
        while let Some(row) = rows.next().await? {
            let id = row.get::<i64>(0)?;
            let vector = decode_embedding(&row.get::<String>(1)?)?;
            let score = f64::from(cosine_similarity(query, &vector));
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((id, score));
            }
        }
        Ok(best)
    }

    /// Attach a generated bundle to a cached requirement row.
    ///
    /// A requirement keeps its first generation: if an artifact already
    /// exists for the row, this call leaves it in place and returns without
    /// writing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn store_cached_artifact(
        &self,
        requirement_id: i64,
        output_type: &str,
        content: &Value,
        model: &str,
        prompt_version: &str,
        metadata: &Value,
    ) -> Result<(), DatabaseError> {
        if self.get_artifact_for(requirement_id).await?.is_some() {
            return Ok(());
        }

        self.conn()
            .execute(
                "INSERT INTO cached_artifacts
                     (requirement_id, output_type, content_json, model, prompt_version, metadata_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    requirement_id,
                    output_type,
                    content.to_string(),
                    model,
                    prompt_version,
                    metadata.to_string()
                ],
            )
            .await?;
        Ok(())
    }
}

/// Convert a libSQL row to a `CachedArtifact` struct.
fn row_to_artifact(row: &libsql::Row) -> Result<CachedArtifact, DatabaseError> {
    let content = serde_json::from_str(&row.get::<String>(2)?)
        .map_err(|e| DatabaseError::Query(format!("Failed to parse cached content: {e}")))?;
    Ok(CachedArtifact {
        requirement_id: row.get::<i64>(0)?,
        output_type: row.get::<String>(1)?,
        content,
        model: row.get::<String>(3)?,
        prompt_version: row.get::<String>(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::helpers::sha256_hex;

    async fn test_db() -> ReqDb {
        ReqDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn hash_hit_returns_stored_bundle() {
        let db = test_db().await;
        let normalized = "users can reset passwords";
        let hash = sha256_hex(normalized);

        let req_id = db
            .ensure_cached_requirement("Users can reset passwords", normalized, &hash, None)
            .await
            .unwrap();
        db.store_cached_artifact(
            req_id,
            "requirements_bundle",
            &json!({"stories": []}),
            "gpt-4o-mini",
            "cache_policy_v1",
            &json!({}),
        )
        .await
        .unwrap();

        let hit = db.get_cached_by_hash(&hash).await.unwrap().unwrap();
        assert_eq!(hit.requirement_id, req_id);
        assert_eq!(hit.content, json!({"stories": []}));
        assert_eq!(hit.prompt_version, "cache_policy_v1");
    }

    #[tokio::test]
    async fn unknown_hash_misses() {
        let db = test_db().await;
        assert!(db.get_cached_by_hash("no-such-hash").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ensure_is_idempotent_by_hash() {
        let db = test_db().await;
        let hash = sha256_hex("text");
        let a = db
            .ensure_cached_requirement("Text", "text", &hash, Some(&[1.0, 0.0]))
            .await
            .unwrap();
        let b = db
            .ensure_cached_requirement("TEXT", "text", &hash, Some(&[0.0, 1.0]))
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn nearest_picks_highest_similarity() {
        let db = test_db().await;
        db.ensure_cached_requirement("a", "a", &sha256_hex("a"), Some(&[1.0, 0.0]))
            .await
            .unwrap();
        let close_id = db
            .ensure_cached_requirement("b", "b", &sha256_hex("b"), Some(&[0.9, 0.1]))
            .await
            .unwrap();

        let (id, score) = db
            .nearest_cached_requirement(&[0.9, 0.15])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id, close_id);
        assert!(score > 0.99);
    }

    #[tokio::test]
    async fn nearest_on_empty_cache_is_none() {
        let db = test_db().await;
        assert!(
            db.nearest_cached_requirement(&[1.0, 0.0])
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn first_artifact_wins() {
        let db = test_db().await;
        let hash = sha256_hex("t");
        let req_id = db
            .ensure_cached_requirement("t", "t", &hash, None)
            .await
            .unwrap();

        db.store_cached_artifact(
            req_id,
            "requirements_bundle",
            &json!({"v": 1}),
            "m",
            "cache_policy_v1",
            &json!({}),
        )
        .await
        .unwrap();
        db.store_cached_artifact(
            req_id,
            "requirements_bundle",
            &json!({"v": 2}),
            "m",
            "cache_policy_v1",
            &json!({}),
        )
        .await
        .unwrap();

        let hit = db.get_cached_by_hash(&hash).await.unwrap().unwrap();
        assert_eq!(hit.content, json!({"v": 1}));
    }
}
