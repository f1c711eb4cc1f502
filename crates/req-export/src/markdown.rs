//! Human-readable markdown rendering of a requirement set.

use req_core::entities::{Epic, GherkinScenario, RequirementSet};

/// Render the full requirement set as a markdown document: epic, stories,
/// Gherkin acceptance criteria grouped by story, and the quality summary.
#[must_use]
pub fn to_markdown(epic: &Epic, req: &RequirementSet) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# Requirement Set ({})", req.mode));
    lines.push(String::new());
    lines.push(format!("## Epic {}", epic.epic_id));
    lines.push(epic.text.trim().to_string());
    lines.push(String::new());

    if !epic.constraints.is_empty() {
        lines.push("### Constraints".to_string());
        for c in &epic.constraints {
            lines.push(format!("- {c}"));
        }
        lines.push(String::new());
    }

    lines.push("## User Stories".to_string());
    for story in &req.stories {
        lines.push(format!("### {}", story.story_id));
        lines.push(story.story_text.clone());
        if !story.assumptions.is_empty() {
            lines.push(String::new());
            lines.push("**Assumptions**".to_string());
            for a in &story.assumptions {
                lines.push(format!("- {a}"));
            }
        }
        if !story.open_questions.is_empty() {
            lines.push(String::new());
            lines.push("**Open questions**".to_string());
            for q in &story.open_questions {
                lines.push(format!("- {q}"));
            }
        }
        lines.push(String::new());
    }

    lines.push("## Acceptance Criteria (Gherkin)".to_string());
    for (story_id, scenarios) in group_by_story(&req.scenarios) {
        lines.push(format!("### {story_id}"));
        for sc in scenarios {
            lines.push(format!("#### {}: {}", sc.scenario_id, sc.title));
            for g in &sc.given {
                lines.push(format!("- GIVEN {g}"));
            }
            for w in &sc.when {
                lines.push(format!("- WHEN {w}"));
            }
            for t in &sc.then {
                lines.push(format!("- THEN {t}"));
            }
            lines.push(String::new());
        }
    }

    lines.push("## Quality Summary".to_string());
    for qr in &req.quality_reports {
        let inv = &qr.invest;
        lines.push(format!(
            "- **{}** Overall: {:.2} | INVEST(I,N,V,E,S,T)=({},{},{},{},{},{}) | Gherkin valid: {}",
            qr.story_id,
            qr.overall_score,
            inv.independent,
            inv.negotiable,
            inv.valuable,
            inv.estimable,
            inv.small,
            inv.testable,
            qr.gherkin_valid,
        ));
    }
    lines.push(String::new());

    lines.join("\n")
}

/// Group scenarios by story, preserving first-seen story order.
fn group_by_story(scenarios: &[GherkinScenario]) -> Vec<(&str, Vec<&GherkinScenario>)> {
    let mut groups: Vec<(&str, Vec<&GherkinScenario>)> = Vec::new();
    for sc in scenarios {
        match groups.iter_mut().find(|(id, _)| *id == sc.story_id) {
            Some((_, list)) => list.push(sc),
            None => groups.push((sc.story_id.as_str(), vec![sc])),
        }
    }
    groups
}
