//! User story repository.
//!
//! Story IDs restart at US-001 for every epic, so all lookups are keyed by
//! `(epic_id, id)`. Stories carry a `text_hash` of their story text;
//! embeddings are pinned to that hash, so editing a story's text
//! automatically invalidates its stored vector.

use chrono::Utc;

use req_core::entities::{Epic, GherkinScenario, UserStory};
use req_core::enums::StoryStatus;

use crate::ReqDb;
use crate::error::DatabaseError;
use crate::helpers::{
    decode_embedding, encode_embedding, parse_enum, parse_string_list, sha256_hex,
};

/// Epic-qualified embedding owner ID for a story.
#[must_use]
pub fn story_embedding_owner(epic_id: &str, story_id: &str) -> String {
    format!("{epic_id}/{story_id}")
}

impl ReqDb {
    /// Insert a user story. The parent epic must already exist.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the epic is missing (foreign key) or the
    /// INSERT fails.
    pub async fn insert_story(&self, story: &UserStory) -> Result<(), DatabaseError> {
        let assumptions_json = serde_json::to_string(&story.assumptions)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        let open_questions_json = serde_json::to_string(&story.open_questions)
            .map_err(|e| DatabaseError::Other(e.into()))?;

        self.conn()
            .execute(
                "INSERT INTO stories
                     (epic_id, id, role, goal, benefit, story_text, text_hash,
                      assumptions_json, open_questions_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                libsql::params![
                    story.epic_id.as_str(),
                    story.story_id.as_str(),
                    story.role.as_str(),
                    story.goal.as_str(),
                    story.benefit.as_str(),
                    story.story_text.as_str(),
                    sha256_hex(&story.story_text),
                    assumptions_json,
                    open_questions_json
                ],
            )
            .await?;
        Ok(())
    }

    /// Get a story by epic and ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the story does not exist.
    pub async fn get_story(&self, epic_id: &str, id: &str) -> Result<UserStory, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, epic_id, role, goal, benefit, story_text,
                        assumptions_json, open_questions_json
                 FROM stories WHERE epic_id = ?1 AND id = ?2",
                [epic_id, id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_story(&row)
    }

    /// List all stories under an epic, in ID order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_stories(&self, epic_id: &str) -> Result<Vec<UserStory>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, epic_id, role, goal, benefit, story_text,
                        assumptions_json, open_questions_json
                 FROM stories WHERE epic_id = ?1 ORDER BY id",
                [epic_id],
            )
            .await?;

        let mut stories = Vec::new();
        while let Some(row) = rows.next().await? {
            stories.push(row_to_story(&row)?);
        }
        Ok(stories)
    }

    /// Current lifecycle status of a story.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the story does not exist.
    pub async fn get_story_status(
        &self,
        epic_id: &str,
        id: &str,
    ) -> Result<StoryStatus, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT status FROM stories WHERE epic_id = ?1 AND id = ?2",
                [epic_id, id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        parse_enum(&row.get::<String>(0)?)
    }

    /// Transition a story's lifecycle status.
    ///
    /// Rejecting a story cascades the rejection to its scenarios: an
    /// acceptance scenario for a rejected story has nothing to validate.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the transition is not
    /// allowed from the current status.
    pub async fn set_story_status(
        &self,
        epic_id: &str,
        id: &str,
        to: StoryStatus,
    ) -> Result<(), DatabaseError> {
        let current = self.get_story_status(epic_id, id).await?;
        if !current.can_transition_to(to) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition story {id} from {current} to {to}"
            )));
        }

        let now = Utc::now();
        self.conn()
            .execute(
                "UPDATE stories SET status = ?1, updated_at = ?2
                 WHERE epic_id = ?3 AND id = ?4",
                libsql::params![to.as_str(), now.to_rfc3339(), epic_id, id],
            )
            .await?;

        if to == StoryStatus::Rejected {
            self.conn()
                .execute(
                    "UPDATE scenarios SET status = 'rejected', updated_at = ?1
                     WHERE epic_id = ?2 AND story_id = ?3",
                    libsql::params![now.to_rfc3339(), epic_id, id],
                )
                .await?;
        }
        Ok(())
    }

    /// Replace a story's text after a refinement pass.
    ///
    /// Updates the text hash and deletes any stored embedding for the story,
    /// since the old vector no longer describes the new text.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the story does not exist.
    pub async fn update_story_text(
        &self,
        epic_id: &str,
        id: &str,
        story_text: &str,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let affected = self
            .conn()
            .execute(
                "UPDATE stories SET story_text = ?1, text_hash = ?2, updated_at = ?3
                 WHERE epic_id = ?4 AND id = ?5",
                libsql::params![
                    story_text,
                    sha256_hex(story_text),
                    now.to_rfc3339(),
                    epic_id,
                    id
                ],
            )
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }

        self.conn()
            .execute(
                "DELETE FROM embeddings WHERE owner_type = 'story' AND owner_id = ?1",
                [story_embedding_owner(epic_id, id)],
            )
            .await?;
        Ok(())
    }

    /// Replace an epic's persisted decomposition with a new one.
    ///
    /// Deletes the epic's scenarios and stories, inserts the new set, and
    /// marks the epic decomposed. Called once per accepted run.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any statement fails.
    pub async fn replace_decomposition(
        &self,
        epic: &Epic,
        stories: &[UserStory],
        scenarios: &[GherkinScenario],
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "DELETE FROM scenarios WHERE epic_id = ?1",
                [epic.epic_id.as_str()],
            )
            .await?;
        self.conn()
            .execute(
                "DELETE FROM stories WHERE epic_id = ?1",
                [epic.epic_id.as_str()],
            )
            .await?;

        for story in stories {
            self.insert_story(story).await?;
        }
        for scenario in scenarios {
            self.insert_scenario(&epic.epic_id, scenario).await?;
        }
        self.mark_epic_decomposed(&epic.epic_id).await?;
        Ok(())
    }

    /// Store (or replace) the embedding for a story or scenario.
    ///
    /// The caller passes the epic-qualified owner ID and the hash of the
    /// text the vector was computed from.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if serialization or the INSERT fails.
    pub async fn upsert_embedding(
        &self,
        owner_type: &str,
        owner_id: &str,
        text_hash: &str,
        vector: &[f32],
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO embeddings (owner_type, owner_id, text_hash, vector_json)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(owner_type, owner_id) DO UPDATE SET
                     text_hash = excluded.text_hash,
                     vector_json = excluded.vector_json,
                     created_at = datetime('now')",
                libsql::params![owner_type, owner_id, text_hash, encode_embedding(vector)?],
            )
            .await?;
        Ok(())
    }

    /// Fetch a stored embedding, but only if it still matches the given
    /// text hash. Returns `None` for stale or missing vectors.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_embedding(
        &self,
        owner_type: &str,
        owner_id: &str,
        text_hash: &str,
    ) -> Result<Option<Vec<f32>>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT vector_json FROM embeddings
                 WHERE owner_type = ?1 AND owner_id = ?2 AND text_hash = ?3",
                libsql::params![owner_type, owner_id, text_hash],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(decode_embedding(&row.get::<String>(0)?)?)),
            None => Ok(None),
        }
    }
}

/// Convert a libSQL row to a `UserStory` struct.
fn row_to_story(row: &libsql::Row) -> Result<UserStory, DatabaseError> {
    Ok(UserStory {
        story_id: row.get::<String>(0)?,
        epic_id: row.get::<String>(1)?,
        role: row.get::<String>(2)?,
        goal: row.get::<String>(3)?,
        benefit: row.get::<String>(4)?,
        story_text: row.get::<String>(5)?,
        assumptions: parse_string_list(&row.get::<String>(6)?)?,
        open_questions: parse_string_list(&row.get::<String>(7)?)?,
    })
}
