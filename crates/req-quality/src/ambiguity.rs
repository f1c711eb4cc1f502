//! Ambiguity lexicon scan.
//!
//! Flags hedge words and vague qualifiers wherever they appear in story
//! text, assumptions, open questions, or scenario steps. Soft findings:
//! they lower the score without blocking acceptance.

use req_core::entities::{GherkinScenario, UserStory};

/// Terms that usually hide an unstated requirement.
const AMBIGUOUS_TERMS: &[&str] = &[
    "fast",
    "quick",
    "easy",
    "easily",
    "simple",
    "user-friendly",
    "appropriate",
    "support",
    "handle",
    "robust",
    "asap",
    "soon",
    "etc",
    "various",
    "some",
    "normally",
    "should",
    "could",
    "may",
];

fn scan(text: &str, label: &str, hits: &mut Vec<String>) {
    let lower = text.to_lowercase();
    for term in AMBIGUOUS_TERMS {
        if lower.contains(term) {
            hits.push(format!("{label}: ambiguous term '{term}' in '{text}'"));
        }
    }
}

/// Scan stories and scenarios for ambiguous wording. Each hit names the
/// owning story or scenario ID so penalties can be attributed per story.
#[must_use]
pub fn detect_ambiguities(stories: &[UserStory], scenarios: &[GherkinScenario]) -> Vec<String> {
    let mut hits = Vec::new();

    for story in stories {
        let id = &story.story_id;
        scan(&story.story_text, &format!("{id}.story_text"), &mut hits);
        for assumption in &story.assumptions {
            scan(assumption, &format!("{id}.assumption"), &mut hits);
        }
        for question in &story.open_questions {
            scan(question, &format!("{id}.open_question"), &mut hits);
        }
    }

    for scenario in scenarios {
        for line in scenario.all_steps() {
            scan(line, &scenario.scenario_id, &mut hits);
        }
    }

    hits
}
