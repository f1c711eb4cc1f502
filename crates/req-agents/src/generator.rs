//! Generator agent: epic in, story/scenario bundle out.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use req_core::entities::{Epic, GherkinScenario, UserStory};
use req_core::ids::{PREFIX_SCENARIO, PREFIX_STORY, has_prefix};
use req_llm::Completion;

use crate::error::AgentError;
use crate::json::{DEFAULT_MAX_RETRIES, complete_validated};
use crate::prompts::{GENERATOR_SYSTEM_PROMPT, adapt_user_prompt, generator_user_prompt};

/// What the generator (and refiner) must return: stories, scenarios, and
/// the story-to-scenario trace map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GeneratedBundle {
    pub stories: Vec<UserStory>,
    pub scenarios: Vec<GherkinScenario>,
    pub trace_map: BTreeMap<String, Vec<String>>,
}

/// Constraints serde cannot express. Used as the repair-loop validator for
/// both generation and refinement.
pub(crate) fn validate_bundle(bundle: &GeneratedBundle) -> Result<(), String> {
    if bundle.stories.is_empty() {
        return Err("stories must contain at least one item".to_string());
    }
    if bundle.scenarios.is_empty() {
        return Err("scenarios must contain at least one item".to_string());
    }
    for story in &bundle.stories {
        if !has_prefix(&story.story_id, PREFIX_STORY) {
            return Err(format!(
                "story id '{}' must be sequential like {PREFIX_STORY}-001",
                story.story_id
            ));
        }
    }
    for scenario in &bundle.scenarios {
        if !has_prefix(&scenario.scenario_id, PREFIX_SCENARIO) {
            return Err(format!(
                "scenario id '{}' must be sequential like {PREFIX_SCENARIO}-001",
                scenario.scenario_id
            ));
        }
    }
    Ok(())
}

/// Generate a fresh bundle for an epic.
///
/// # Errors
///
/// Returns [`AgentError`] if the completion fails or the model never
/// produces a valid bundle within the repair budget.
pub async fn generate_bundle<C: Completion>(
    llm: &C,
    epic: &Epic,
) -> Result<GeneratedBundle, AgentError> {
    tracing::info!(epic_id = %epic.epic_id, "generating bundle");
    complete_validated(
        llm,
        GENERATOR_SYSTEM_PROMPT,
        &generator_user_prompt(epic),
        validate_bundle,
        DEFAULT_MAX_RETRIES,
    )
    .await
}

/// Adapt a similar epic's cached bundle to a new epic.
///
/// Used by the semantic cache's adapt band: close enough to start from,
/// too far to reuse verbatim.
///
/// # Errors
///
/// Returns [`AgentError`] if the completion fails or the model never
/// produces a valid bundle within the repair budget.
pub async fn adapt_bundle<C: Completion>(
    llm: &C,
    epic: &Epic,
    draft_bundle: &serde_json::Value,
    similarity: f64,
) -> Result<GeneratedBundle, AgentError> {
    tracing::info!(epic_id = %epic.epic_id, similarity, "adapting cached bundle");
    complete_validated(
        llm,
        GENERATOR_SYSTEM_PROMPT,
        &adapt_user_prompt(epic, draft_bundle, similarity),
        validate_bundle,
        DEFAULT_MAX_RETRIES,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::test_support::{Scripted, sample_epic};

    const BUNDLE_JSON: &str = r#"{
        "stories": [{
            "story_id": "US-001",
            "epic_id": "E-AUTH",
            "role": "user",
            "goal": "reset my password",
            "benefit": "I regain access",
            "story_text": "As a user, I want to reset my password so that I regain access."
        }],
        "scenarios": [{
            "scenario_id": "SC-001",
            "story_id": "US-001",
            "title": "Reset link is sent",
            "given": ["a registered user"],
            "when": ["they request a reset"],
            "then": ["a reset link is emailed"]
        }],
        "trace_map": {"US-001": ["SC-001"]}
    }"#;

    #[tokio::test]
    async fn generates_valid_bundle() {
        let llm = Scripted::new(&[BUNDLE_JSON]);
        let bundle = generate_bundle(&llm, &sample_epic()).await.unwrap();

        assert_eq!(bundle.stories.len(), 1);
        assert_eq!(bundle.stories[0].story_id, "US-001");
        assert_eq!(bundle.trace_map["US-001"], vec!["SC-001"]);
    }

    #[tokio::test]
    async fn empty_stories_repaired() {
        let empty = r#"{"stories": [], "scenarios": [], "trace_map": {}}"#;
        let llm = Scripted::new(&[empty, BUNDLE_JSON]);
        let bundle = generate_bundle(&llm, &sample_epic()).await.unwrap();
        assert_eq!(bundle.stories.len(), 1);

        let prompts = llm.prompts();
        assert!(prompts[1].contains("at least one item"));
    }

    #[tokio::test]
    async fn malformed_story_id_repaired() {
        let bad_id = BUNDLE_JSON.replace("US-001", "STORY-1");
        let llm = Scripted::new(&[bad_id.as_str(), BUNDLE_JSON]);
        let bundle = generate_bundle(&llm, &sample_epic()).await.unwrap();
        assert_eq!(bundle.stories[0].story_id, "US-001");

        let prompts = llm.prompts();
        assert!(prompts[1].contains("must be sequential like US-001"));
    }

    #[tokio::test]
    async fn malformed_scenario_id_repaired() {
        let bad_id = BUNDLE_JSON.replace("SC-001", "SC-abc");
        let llm = Scripted::new(&[bad_id.as_str(), BUNDLE_JSON]);
        let bundle = generate_bundle(&llm, &sample_epic()).await.unwrap();
        assert_eq!(bundle.scenarios[0].scenario_id, "SC-001");

        let prompts = llm.prompts();
        assert!(prompts[1].contains("must be sequential like SC-001"));
    }

    #[tokio::test]
    async fn unknown_fields_rejected_then_repaired() {
        let extra = r#"{"stories": [], "scenarios": [], "trace_map": {}, "notes": "hi"}"#;
        let llm = Scripted::new(&[extra, BUNDLE_JSON]);
        assert!(generate_bundle(&llm, &sample_epic()).await.is_ok());
    }

    #[tokio::test]
    async fn adapt_includes_draft_in_prompt() {
        let llm = Scripted::new(&[BUNDLE_JSON]);
        let draft = serde_json::json!({"stories": [{"story_id": "US-001"}]});
        adapt_bundle(&llm, &sample_epic(), &draft, 0.85)
            .await
            .unwrap();

        let prompts = llm.prompts();
        assert!(prompts[0].contains("Draft bundle:"));
        assert!(prompts[0].contains("similarity 0.85"));
    }
}
