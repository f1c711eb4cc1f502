//! Refiner agent: applies critique edits to produce an improved bundle.

use req_core::entities::{Critique, Epic, RequirementSet};
use req_llm::Completion;

use crate::error::AgentError;
use crate::generator::{GeneratedBundle, validate_bundle};
use crate::json::{DEFAULT_MAX_RETRIES, complete_validated};
use crate::prompts::{REFINER_SYSTEM_PROMPT, refiner_user_prompt};

/// Apply a critique's edits to the current requirement set.
///
/// Returns a full replacement bundle, not a patch: the refiner re-emits
/// every story and scenario with the edits applied.
///
/// # Errors
///
/// Returns [`AgentError`] if the completion fails or the model never
/// produces a valid bundle within the repair budget.
pub async fn refine<C: Completion>(
    llm: &C,
    epic: &Epic,
    req: &RequirementSet,
    critique: &Critique,
) -> Result<GeneratedBundle, AgentError> {
    tracing::info!(epic_id = %epic.epic_id, edits = critique.edits.len(), "refining bundle");
    complete_validated(
        llm,
        REFINER_SYSTEM_PROMPT,
        &refiner_user_prompt(epic, req, critique),
        validate_bundle,
        DEFAULT_MAX_RETRIES,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use req_core::entities::RunMetadata;
    use req_core::enums::Mode;

    use crate::test_support::{Scripted, sample_epic};

    fn current_set() -> RequirementSet {
        RequirementSet {
            epic_id: "E-AUTH".to_string(),
            mode: Mode::Agentic,
            stories: vec![],
            scenarios: vec![],
            quality_reports: vec![],
            trace_map: BTreeMap::new(),
            run_metadata: RunMetadata {
                run_id: "r".to_string(),
                epic_id: "E-AUTH".to_string(),
                mode: Mode::Agentic,
                iteration: 0,
                model_name: None,
                temperature: None,
            },
        }
    }

    fn no_op_critique() -> Critique {
        Critique {
            should_iterate: true,
            summary: "tighten THEN steps".to_string(),
            edits: vec![],
        }
    }

    const REFINED_JSON: &str = r#"{
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
            "then": ["a reset link is emailed within 5 minutes"]
        }],
        "trace_map": {"US-001": ["SC-001"]}
    }"#;

    #[tokio::test]
    async fn refine_returns_replacement_bundle() {
        let llm = Scripted::new(&[REFINED_JSON]);
        let bundle = refine(&llm, &sample_epic(), &current_set(), &no_op_critique())
            .await
            .unwrap();
        assert_eq!(bundle.stories.len(), 1);
        assert_eq!(bundle.scenarios[0].then[0], "a reset link is emailed within 5 minutes");
    }

    #[tokio::test]
    async fn prompt_embeds_critique() {
        let llm = Scripted::new(&[REFINED_JSON]);
        refine(&llm, &sample_epic(), &current_set(), &no_op_critique())
            .await
            .unwrap();

        let prompts = llm.prompts();
        assert!(prompts[0].starts_with("Apply edits to this JSON:"));
        assert!(prompts[0].contains("tighten THEN steps"));
    }
}
