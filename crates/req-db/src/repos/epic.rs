//! Epic repository.
//!
//! Epics are the pipeline input. They start in `submitted` status and move
//! to `decomposed` once a run has produced stories for them.

use chrono::Utc;

use req_core::entities::Epic;
use req_core::enums::EpicStatus;

use crate::ReqDb;
use crate::error::DatabaseError;
use crate::helpers::{parse_enum, parse_string_list};

impl ReqDb {
    /// Insert an epic. Validates the entity first.
    ///
    /// Re-submitting an existing epic updates its text and glossary in
    /// place rather than failing, so a reworded epic can be re-run.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if validation or the INSERT fails.
    pub async fn upsert_epic(&self, epic: &Epic) -> Result<(), DatabaseError> {
        epic.validate()
            .map_err(|e| DatabaseError::InvalidState(e.to_string()))?;

        let glossary_json = serde_json::to_string(&epic.glossary)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        let constraints_json = serde_json::to_string(&epic.constraints)
            .map_err(|e| DatabaseError::Other(e.into()))?;

        self.conn()
            .execute(
                "INSERT INTO epics (id, text, glossary_json, constraints_json)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     text = excluded.text,
                     glossary_json = excluded.glossary_json,
                     constraints_json = excluded.constraints_json,
                     updated_at = datetime('now')",
                libsql::params![
                    epic.epic_id.as_str(),
                    epic.text.as_str(),
                    glossary_json,
                    constraints_json
                ],
            )
            .await?;
        Ok(())
    }

    /// Get an epic by ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the epic does not exist.
    pub async fn get_epic(&self, id: &str) -> Result<Epic, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, text, glossary_json, constraints_json FROM epics WHERE id = ?1",
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_epic(&row)
    }

    /// Current lifecycle status of an epic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the epic does not exist.
    pub async fn get_epic_status(&self, id: &str) -> Result<EpicStatus, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT status FROM epics WHERE id = ?1", [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        parse_enum(&row.get::<String>(0)?)
    }

    /// List all epics, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_epics(&self) -> Result<Vec<Epic>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, text, glossary_json, constraints_json
                 FROM epics ORDER BY created_at DESC",
                (),
            )
            .await?;

        let mut epics = Vec::new();
        while let Some(row) = rows.next().await? {
            epics.push(row_to_epic(&row)?);
        }
        Ok(epics)
    }

    /// Mark an epic as decomposed after a run has persisted its stories.
    ///
    /// Validates transition: `Submitted` -> `Decomposed`. Marking an
    /// already-decomposed epic is a no-op, not an error, since each re-run
    /// of the same epic lands here again.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the epic does not exist.
    pub async fn mark_epic_decomposed(&self, id: &str) -> Result<(), DatabaseError> {
        let current = self.get_epic_status(id).await?;
        if current == EpicStatus::Decomposed {
            return Ok(());
        }
        if !current.can_transition_to(EpicStatus::Decomposed) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition epic {id} from {current} to decomposed"
            )));
        }

        let now = Utc::now();
        self.conn()
            .execute(
                "UPDATE epics SET status = 'decomposed', updated_at = ?1 WHERE id = ?2",
                libsql::params![now.to_rfc3339(), id],
            )
            .await?;
        Ok(())
    }
}

/// Convert a libSQL row to an `Epic` struct.
fn row_to_epic(row: &libsql::Row) -> Result<Epic, DatabaseError> {
    let glossary = serde_json::from_str(&row.get::<String>(2)?)
        .map_err(|e| DatabaseError::Query(format!("Failed to parse glossary: {e}")))?;
    Ok(Epic {
        epic_id: row.get::<String>(0)?,
        text: row.get::<String>(1)?,
        glossary,
        constraints: parse_string_list(&row.get::<String>(3)?)?,
    })
}
