//! Critic agent: reviews a requirement set and emits edit instructions.
//!
//! The critic never rewrites anything itself. Its output drives the
//! refiner.

use req_core::entities::{Critique, Epic, RequirementSet};
use req_llm::Completion;

use crate::error::AgentError;
use crate::json::{DEFAULT_MAX_RETRIES, complete_validated};
use crate::prompts::{CRITIC_SYSTEM_PROMPT, critic_user_prompt};

/// Critique a requirement set against its epic.
///
/// # Errors
///
/// Returns [`AgentError`] if the completion fails or the model never
/// produces a valid critique within the repair budget.
pub async fn critique<C: Completion>(
    llm: &C,
    epic: &Epic,
    req: &RequirementSet,
) -> Result<Critique, AgentError> {
    tracing::info!(epic_id = %epic.epic_id, "requesting critique");
    complete_validated(
        llm,
        CRITIC_SYSTEM_PROMPT,
        &critic_user_prompt(epic, req),
        |_: &Critique| Ok(()),
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
    use req_core::enums::{EditAction, IssueType, Mode};

    use crate::test_support::{Scripted, sample_epic};

    fn empty_set() -> RequirementSet {
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

    #[tokio::test]
    async fn parses_critique_with_edits() {
        let raw = r#"{
            "should_iterate": true,
            "summary": "US-001 is vague",
            "edits": [{
                "issue_type": "INVEST_Testable",
                "target_id": "US-001",
                "action": "revise_scenario",
                "rationale": "THEN step is not observable",
                "patch_guidance": "State the exact expected output row count"
            }]
        }"#;
        let llm = Scripted::new(&[raw]);
        let critique = critique(&llm, &sample_epic(), &empty_set()).await.unwrap();

        assert!(critique.should_iterate);
        assert_eq!(critique.edits.len(), 1);
        assert_eq!(critique.edits[0].issue_type, IssueType::InvestTestable);
        assert_eq!(critique.edits[0].action, EditAction::ReviseScenario);
    }

    #[tokio::test]
    async fn edits_default_to_empty() {
        let raw = r#"{"should_iterate": false, "summary": "Looks good"}"#;
        let llm = Scripted::new(&[raw]);
        let critique = critique(&llm, &sample_epic(), &empty_set()).await.unwrap();
        assert!(!critique.should_iterate);
        assert!(critique.edits.is_empty());
    }

    #[tokio::test]
    async fn prompt_embeds_requirement_set() {
        let raw = r#"{"should_iterate": false, "summary": "ok"}"#;
        let llm = Scripted::new(&[raw]);
        critique(&llm, &sample_epic(), &empty_set()).await.unwrap();

        let prompts = llm.prompts();
        assert!(prompts[0].starts_with("Critique this JSON:"));
        assert!(prompts[0].contains("\"requirement_set\""));
    }
}
