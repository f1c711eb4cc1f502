//! Jira CSV import export.
//!
//! One file, three issue types: the epic, its stories (linked via
//! `Epic Link`), and each scenario as a Sub-task under its story's
//! summary. Sub-task attachment follows the trace map, not the raw
//! scenario list, so untraced scenarios are left out deliberately.

use std::fs;
use std::path::Path;

use req_core::entities::{Epic, GherkinScenario, RequirementSet};

use crate::csv::csv_line;
use crate::error::ExportError;

const HEADERS: [&str; 6] = [
    "Issue Type",
    "Summary",
    "Description",
    "Epic Name",
    "Epic Link",
    "Parent Summary",
];

/// Truncated "ID text" summary used for linking rows.
fn summary_of(id: &str, text: &str) -> String {
    let head: String = text.chars().take(60).collect();
    format!("{id} {head}").trim().to_string()
}

/// All traced scenarios for a story as a Gherkin text block.
fn gherkin_text_for_story(story_id: &str, req: &RequirementSet) -> String {
    let scenario_ids = req
        .trace_map
        .get(story_id)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut blocks: Vec<String> = Vec::new();
    for sc in req
        .scenarios
        .iter()
        .filter(|sc| scenario_ids.contains(&sc.scenario_id))
    {
        blocks.push(format!("Scenario: {}", sc.title));
        for g in &sc.given {
            blocks.push(format!("  Given {g}"));
        }
        for w in &sc.when {
            blocks.push(format!("  When {w}"));
        }
        for t in &sc.then {
            blocks.push(format!("  Then {t}"));
        }
        blocks.push(String::new());
    }
    blocks.join("\n").trim().to_string()
}

fn scenario_description(sc: &GherkinScenario) -> String {
    let mut lines = vec![format!("Scenario: {}", sc.title)];
    for g in &sc.given {
        lines.push(format!("Given {g}"));
    }
    for w in &sc.when {
        lines.push(format!("When {w}"));
    }
    for t in &sc.then {
        lines.push(format!("Then {t}"));
    }
    lines.join("\n")
}

/// Write the Jira import CSV for a requirement set.
///
/// # Errors
///
/// Returns `ExportError::Io` if the file or its parent directory cannot be
/// written.
pub fn export_jira_csv(
    epic: &Epic,
    req: &RequirementSet,
    out_path: &Path,
) -> Result<(), ExportError> {
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let epic_name = summary_of(&epic.epic_id, &epic.text);
    let mut lines = vec![HEADERS.map(ToString::to_string).join(",")];

    lines.push(csv_line(&[
        "Epic".to_string(),
        epic_name.clone(),
        format!("Epic ID: {}\n\n{}", epic.epic_id, epic.text),
        epic_name.clone(),
        String::new(),
        String::new(),
    ]));

    let mut story_summaries: Vec<(String, String)> = Vec::new();
    for story in &req.stories {
        let summary = summary_of(&story.story_id, &story.story_text);
        story_summaries.push((story.story_id.clone(), summary.clone()));

        let mut desc_parts = vec![story.story_text.clone(), String::new()];
        if !story.assumptions.is_empty() {
            desc_parts.push("Assumptions:".to_string());
            desc_parts.extend(story.assumptions.iter().map(|a| format!("- {a}")));
            desc_parts.push(String::new());
        }
        if !story.open_questions.is_empty() {
            desc_parts.push("Open Questions:".to_string());
            desc_parts.extend(story.open_questions.iter().map(|q| format!("- {q}")));
            desc_parts.push(String::new());
        }
        let gherkin = gherkin_text_for_story(&story.story_id, req);
        if !gherkin.is_empty() {
            desc_parts.push("Acceptance Criteria (Gherkin):".to_string());
            desc_parts.push(gherkin);
        }

        lines.push(csv_line(&[
            "Story".to_string(),
            summary,
            desc_parts.join("\n").trim().to_string(),
            String::new(),
            epic_name.clone(),
            String::new(),
        ]));
    }

    for (story_id, scenario_ids) in &req.trace_map {
        let Some((_, parent_summary)) = story_summaries.iter().find(|(id, _)| id == story_id)
        else {
            continue;
        };

        for sc_id in scenario_ids {
            let Some(sc) = req.scenarios.iter().find(|sc| &sc.scenario_id == sc_id) else {
                continue;
            };
            lines.push(csv_line(&[
                "Sub-task".to_string(),
                summary_of(&sc.scenario_id, &sc.title),
                scenario_description(sc),
                String::new(),
                String::new(),
                parent_summary.clone(),
            ]));
        }
    }

    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(out_path, content)?;
    Ok(())
}
