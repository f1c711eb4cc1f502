//! ID prefixes and formatting helpers.
//!
//! Stories and scenarios carry sequential IDs the LLM is asked to emit
//! (`US-001`, `SC-001`, ...). Runs carry random v4 UUIDs so parallel runs of
//! the same epic never collide in the output tree.

use uuid::Uuid;

/// Prefix for user story IDs (`US-001`).
pub const PREFIX_STORY: &str = "US";

/// Prefix for Gherkin scenario IDs (`SC-001`).
pub const PREFIX_SCENARIO: &str = "SC";

/// Format a sequential story ID: `format_story_id(1)` → `"US-001"`.
#[must_use]
pub fn format_story_id(n: u32) -> String {
    format!("{PREFIX_STORY}-{n:03}")
}

/// Format a sequential scenario ID: `format_scenario_id(12)` → `"SC-012"`.
#[must_use]
pub fn format_scenario_id(n: u32) -> String {
    format!("{PREFIX_SCENARIO}-{n:03}")
}

/// Generate a fresh run ID (random UUID v4, hyphenated lowercase).
#[must_use]
pub fn new_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Check whether an ID carries the given prefix and a numeric suffix.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}
