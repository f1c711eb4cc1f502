//! Offline baseline: a single generic story and scenario.
//!
//! Guarantees downstream code always has at least one story and scenario
//! to work with, with no API key and no network. Also serves as the
//! comparison floor for the agentic loop's scores.

use std::collections::BTreeMap;

use req_core::entities::{Epic, GherkinScenario, UserStory};
use req_core::ids::{format_scenario_id, format_story_id};

use crate::generator::GeneratedBundle;

/// Build the stub bundle for an epic.
#[must_use]
pub fn generate_baseline(epic: &Epic) -> GeneratedBundle {
    let story_id = format_story_id(1);
    let scenario_id = format_scenario_id(1);

    let story = UserStory {
        story_id: story_id.clone(),
        epic_id: epic.epic_id.clone(),
        role: "user".to_string(),
        goal: "achieve the capability described in the epic".to_string(),
        benefit: "fulfil the epic requirement".to_string(),
        story_text: "As a user, I want the system to fulfil the epic requirement so that I can achieve the intended outcome."
            .to_string(),
        assumptions: vec!["Epic lacks detail; clarification may be required.".to_string()],
        open_questions: vec![
            "What are the exact success criteria and constraints?".to_string(),
        ],
    };

    let scenario = GherkinScenario {
        scenario_id: scenario_id.clone(),
        story_id: story_id.clone(),
        title: "Basic success path".to_string(),
        given: vec!["Given the user has access to the system".to_string()],
        when: vec![
            "When the user performs the primary action described by the epic".to_string(),
        ],
        then: vec![
            "Then the system produces the expected outcome described by the epic".to_string(),
        ],
    };

    GeneratedBundle {
        stories: vec![story],
        scenarios: vec![scenario],
        trace_map: BTreeMap::from([(story_id, vec![scenario_id])]),
    }
}
