//! INVEST scoring heuristics.
//!
//! Each dimension starts from its best score and is knocked down by lexical
//! signals in the story text. Only the first matching signal per dimension
//! is reported.

use req_core::entities::{GherkinScenario, InvestScores, UserStory};

const DEPENDENCY_SIGNALS: &[&str] = &["depends on", "after ", "before ", "blocked by", "requires"];

const IMPLEMENTATION_SIGNALS: &[&str] = &[
    "database",
    "api",
    "microservice",
    "kubernetes",
    "sql",
    "react",
    "ui button",
];

const VAGUE_SIGNALS: &[&str] = &["etc", "various", "some", "appropriate", "all possible", "any"];

/// Score one story against INVEST. Returns the scores plus the list of
/// issues found.
#[must_use]
pub fn score_story_invest(
    story: &UserStory,
    scenarios: &[GherkinScenario],
) -> (InvestScores, Vec<String>) {
    let mut issues = Vec::new();
    let id = &story.story_id;
    let text = story.story_text.to_lowercase();

    let mut independent = 5;
    if let Some(signal) = DEPENDENCY_SIGNALS.iter().find(|w| text.contains(*w)) {
        independent = 3;
        issues.push(format!("{id}: Independence risk due to '{signal}'."));
    }

    let mut negotiable = 5;
    if let Some(signal) = IMPLEMENTATION_SIGNALS.iter().find(|w| text.contains(*w)) {
        negotiable = 3;
        issues.push(format!(
            "{id}: Negotiability risk (implementation detail: '{signal}')."
        ));
    }

    let valuable = if story.benefit.trim().is_empty() { 2 } else { 5 };
    if valuable < 5 {
        issues.push(format!("{id}: Missing/weak benefit statement."));
    }

    let mut estimable = 5;
    if let Some(signal) = VAGUE_SIGNALS.iter().find(|w| text.contains(*w)) {
        estimable = 3;
        issues.push(format!("{id}: Estimability risk (vague term: '{signal}')."));
    }

    let has_and = text.contains(" and ");
    let small = if has_and { 4 } else { 5 };
    if has_and {
        issues.push(format!("{id}: Possibly too large (contains 'and')."));
    }

    let related: Vec<&GherkinScenario> = scenarios
        .iter()
        .filter(|sc| sc.story_id == story.story_id)
        .collect();
    let testable = if !related.is_empty() && related.iter().all(|sc| !sc.then.is_empty()) {
        4
    } else {
        2
    };
    if testable < 4 {
        issues.push(format!("{id}: Testability weak (missing/weak THEN steps)."));
    }

    (
        InvestScores {
            independent,
            negotiable,
            valuable,
            estimable,
            small,
            testable,
        },
        issues,
    )
}
