//! Gherkin scenario repository.
//!
//! Scenario IDs restart at SC-001 per epic, so lookups are keyed by
//! `(epic_id, id)`. Scenarios are deduplicated per story by a hash over
//! their full text (title plus every step): inserting the same text twice
//! under one story returns `DatabaseError::Duplicate`.

use req_core::entities::GherkinScenario;

use crate::ReqDb;
use crate::error::DatabaseError;
use crate::helpers::{parse_string_list, sha256_hex};

/// Hash of a scenario's full text, used for the per-story dedup constraint.
#[must_use]
pub fn scenario_text_hash(scenario: &GherkinScenario) -> String {
    let mut text = scenario.title.clone();
    for step in scenario.all_steps() {
        text.push('\n');
        text.push_str(step);
    }
    sha256_hex(&text)
}

impl ReqDb {
    /// Insert a scenario. The parent story must already exist under the
    /// epic.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Duplicate` if a scenario with identical text
    /// already exists under the same story.
    pub async fn insert_scenario(
        &self,
        epic_id: &str,
        scenario: &GherkinScenario,
    ) -> Result<(), DatabaseError> {
        let given_json = serde_json::to_string(&scenario.given)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        let when_json = serde_json::to_string(&scenario.when)
            .map_err(|e| DatabaseError::Other(e.into()))?;
        let then_json = serde_json::to_string(&scenario.then)
            .map_err(|e| DatabaseError::Other(e.into()))?;

        let result = self
            .conn()
            .execute(
                "INSERT INTO scenarios
                     (epic_id, id, story_id, title, given_json, when_json, then_json, text_hash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    epic_id,
                    scenario.scenario_id.as_str(),
                    scenario.story_id.as_str(),
                    scenario.title.as_str(),
                    given_json,
                    when_json,
                    then_json,
                    scenario_text_hash(scenario)
                ],
            )
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                Err(DatabaseError::Duplicate(format!(
                    "Scenario text already exists under story {}",
                    scenario.story_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a scenario by epic and ID.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the scenario does not exist.
    pub async fn get_scenario(
        &self,
        epic_id: &str,
        id: &str,
    ) -> Result<GherkinScenario, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, story_id, title, given_json, when_json, then_json
                 FROM scenarios WHERE epic_id = ?1 AND id = ?2",
                [epic_id, id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_scenario(&row)
    }

    /// List all scenarios under a story, in ID order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_scenarios(
        &self,
        epic_id: &str,
        story_id: &str,
    ) -> Result<Vec<GherkinScenario>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, story_id, title, given_json, when_json, then_json
                 FROM scenarios WHERE epic_id = ?1 AND story_id = ?2 ORDER BY id",
                [epic_id, story_id],
            )
            .await?;

        let mut scenarios = Vec::new();
        while let Some(row) = rows.next().await? {
            scenarios.push(row_to_scenario(&row)?);
        }
        Ok(scenarios)
    }
}

/// Convert a libSQL row to a `GherkinScenario` struct.
fn row_to_scenario(row: &libsql::Row) -> Result<GherkinScenario, DatabaseError> {
    Ok(GherkinScenario {
        scenario_id: row.get::<String>(0)?,
        story_id: row.get::<String>(1)?,
        title: row.get::<String>(2)?,
        given: parse_string_list(&row.get::<String>(3)?)?,
        when: parse_string_list(&row.get::<String>(4)?)?,
        then: parse_string_list(&row.get::<String>(5)?)?,
    })
}
