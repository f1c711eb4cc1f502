//! Prompt templates for the three agents.
//!
//! Kept together so prompt wording is reviewable in one place. User
//! prompts embed the epic (and for critic/refiner, the current set) as
//! pretty-printed JSON.

use req_core::entities::{Critique, Epic, RequirementSet};
use serde_json::json;

pub const GENERATOR_SYSTEM_PROMPT: &str = "\
You are a Requirements Engineering assistant.
Transform the Epic into high-quality User Stories and Gherkin Acceptance Criteria.

Hard rules:
- Output JSON ONLY (no markdown, no commentary).
- Must match this schema exactly (keys and structure): stories[], scenarios[], trace_map.
- IDs: US-001, US-002... and SC-001, SC-002...
- Each story must include epic_id exactly matching the input epic_id.
- Every scenario must have >=1 Given, >=1 When, >=1 Then.
- If unclear, put details in assumptions/open_questions rather than guessing.
";

pub const CRITIC_SYSTEM_PROMPT: &str = "\
You are a Requirements Engineering Critic.
You do NOT rewrite stories. You identify issues and output edit instructions.

Rules:
- Output JSON only (no markdown).
- Must match the schema exactly: should_iterate, summary, edits[].
- Only reference IDs that exist in the current RequirementSet.
- Be strict about INVEST and Given/When/Then completeness.
- patch_guidance must be actionable and specific.
";

pub const REFINER_SYSTEM_PROMPT: &str = "\
You are a Requirements Engineering Refiner.
Apply the Critique edit instructions to improve the RequirementSet.

Rules:
- Output JSON only.
- Must match schema: stories[], scenarios[], trace_map.
- Preserve existing IDs where possible.
- If splitting, continue numbering (US-002 etc / SC-002 etc).
- Every scenario must include >=1 Given, >=1 When, >=1 Then.
- Do not expand scope beyond the Epic; add open_questions instead of guessing.
";

/// Glossary as a bulleted list, `(none)` when empty.
#[must_use]
pub fn format_glossary(epic: &Epic) -> String {
    if epic.glossary.is_empty() {
        return "(none)".to_string();
    }
    epic.glossary
        .iter()
        .map(|g| format!("- {}: {}", g.term, g.definition))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Constraints as a bulleted list, `(none)` when empty.
#[must_use]
pub fn format_constraints(epic: &Epic) -> String {
    if epic.constraints.is_empty() {
        return "(none)".to_string();
    }
    epic.constraints
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User prompt for fresh generation.
#[must_use]
pub fn generator_user_prompt(epic: &Epic) -> String {
    format!(
        "Epic ID: {}\n\n\
         Epic text:\n{}\n\n\
         Constraints:\n{}\n\n\
         Glossary:\n{}\n\n\
         Return JSON with:\n\
         - stories: list of UserStory\n\
         - scenarios: list of GherkinScenario\n\
         - trace_map: map story_id -> list of scenario_id\n",
        epic.epic_id,
        epic.text.trim(),
        format_constraints(epic),
        format_glossary(epic),
    )
}

/// User prompt for adapting a similar epic's cached bundle.
#[must_use]
pub fn adapt_user_prompt(epic: &Epic, draft_bundle: &serde_json::Value, similarity: f64) -> String {
    format!(
        "A previous epic (cosine similarity {similarity:.2}) produced the draft bundle \
         below. Adapt it to the new epic: keep what still applies, rewrite what does \
         not, and renumber IDs from US-001 / SC-001.\n\n\
         {}\n\
         Draft bundle:\n{}\n",
        generator_user_prompt(epic),
        serde_json::to_string_pretty(draft_bundle).unwrap_or_default(),
    )
}

/// User prompt for the critic: epic plus current requirement set.
#[must_use]
pub fn critic_user_prompt(epic: &Epic, req: &RequirementSet) -> String {
    let payload = json!({
        "epic": epic,
        "requirement_set": req,
    });
    format!(
        "Critique this JSON:\n{}",
        serde_json::to_string_pretty(&payload).unwrap_or_default()
    )
}

/// User prompt for the refiner: epic, current set, and the critique.
#[must_use]
pub fn refiner_user_prompt(epic: &Epic, req: &RequirementSet, critique: &Critique) -> String {
    let payload = json!({
        "epic": epic,
        "requirement_set": req,
        "critique": critique,
    });
    format!(
        "Apply edits to this JSON:\n{}",
        serde_json::to_string_pretty(&payload).unwrap_or_default()
    )
}
