//! Traceability checks over a requirement set.
//!
//! IDs must be unique, every scenario must point at an existing story, and
//! the trace map must cover every story with real scenario IDs. All of
//! these are hard violations.

use std::collections::HashSet;

use req_core::entities::RequirementSet;

/// Check referential integrity of a requirement set. Returns
/// `(ok, violations)`.
#[must_use]
pub fn check_trace(req: &RequirementSet) -> (bool, Vec<String>) {
    let mut violations = Vec::new();

    let story_ids: Vec<&str> = req.stories.iter().map(|s| s.story_id.as_str()).collect();
    let story_id_set: HashSet<&str> = story_ids.iter().copied().collect();
    if story_ids.len() != story_id_set.len() {
        violations.push("Duplicate story_id found.".to_string());
    }

    let scenario_ids: Vec<&str> = req
        .scenarios
        .iter()
        .map(|sc| sc.scenario_id.as_str())
        .collect();
    let scenario_id_set: HashSet<&str> = scenario_ids.iter().copied().collect();
    if scenario_ids.len() != scenario_id_set.len() {
        violations.push("Duplicate scenario_id found.".to_string());
    }

    for sc in &req.scenarios {
        if !story_id_set.contains(sc.story_id.as_str()) {
            violations.push(format!(
                "Scenario {} references missing story_id {}.",
                sc.scenario_id, sc.story_id
            ));
        }
    }

    for story in &req.stories {
        if story.epic_id != req.epic_id {
            violations.push(format!(
                "Story {} epic_id does not match requirement set epic_id.",
                story.story_id
            ));
        }
    }

    for story in &req.stories {
        match req.trace_map.get(&story.story_id) {
            None => violations.push(format!(
                "trace_map missing scenarios for story {}.",
                story.story_id
            )),
            Some(mapped) if mapped.is_empty() => violations.push(format!(
                "trace_map missing scenarios for story {}.",
                story.story_id
            )),
            Some(mapped) => {
                for sid in mapped {
                    if !scenario_id_set.contains(sid.as_str()) {
                        violations.push(format!(
                            "trace_map references missing scenario_id {sid} for story {}.",
                            story.story_id
                        ));
                    }
                }
            }
        }
    }

    (violations.is_empty(), violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use req_core::entities::{GherkinScenario, RunMetadata, UserStory};
    use req_core::enums::Mode;

    fn story(id: &str) -> UserStory {
        UserStory {
            story_id: id.to_string(),
            epic_id: "E-1".to_string(),
            role: "user".to_string(),
            goal: "g".to_string(),
            benefit: "b".to_string(),
            story_text: "As a user, I want g.".to_string(),
            assumptions: vec![],
            open_questions: vec![],
        }
    }

    fn scenario(id: &str, story_id: &str) -> GherkinScenario {
        GherkinScenario {
            scenario_id: id.to_string(),
            story_id: story_id.to_string(),
            title: "t".to_string(),
            given: vec!["g".to_string()],
            when: vec!["w".to_string()],
            then: vec!["t".to_string()],
        }
    }

    fn req_set(
        stories: Vec<UserStory>,
        scenarios: Vec<GherkinScenario>,
        trace_map: BTreeMap<String, Vec<String>>,
    ) -> RequirementSet {
        RequirementSet {
            epic_id: "E-1".to_string(),
            mode: Mode::Agentic,
            stories,
            scenarios,
            quality_reports: vec![],
            trace_map,
            run_metadata: RunMetadata {
                run_id: "r".to_string(),
                epic_id: "E-1".to_string(),
                mode: Mode::Agentic,
                iteration: 0,
                model_name: None,
                temperature: None,
            },
        }
    }

    #[test]
    fn consistent_set_passes() {
        let trace_map =
            BTreeMap::from([("US-001".to_string(), vec!["SC-001".to_string()])]);
        let req = req_set(
            vec![story("US-001")],
            vec![scenario("SC-001", "US-001")],
            trace_map,
        );
        let (ok, violations) = check_trace(&req);
        assert!(ok, "{violations:?}");
    }

    #[test]
    fn duplicate_ids_flagged() {
        let trace_map =
            BTreeMap::from([("US-001".to_string(), vec!["SC-001".to_string()])]);
        let req = req_set(
            vec![story("US-001"), story("US-001")],
            vec![scenario("SC-001", "US-001")],
            trace_map,
        );
        let (ok, violations) = check_trace(&req);
        assert!(!ok);
        assert!(violations.iter().any(|v| v.contains("Duplicate story_id")));
    }

    #[test]
    fn orphan_scenario_flagged() {
        let trace_map =
            BTreeMap::from([("US-001".to_string(), vec!["SC-001".to_string()])]);
        let req = req_set(
            vec![story("US-001")],
            vec![scenario("SC-001", "US-001"), scenario("SC-002", "US-999")],
            trace_map,
        );
        let (ok, violations) = check_trace(&req);
        assert!(!ok);
        assert!(violations.iter().any(|v| v.contains("missing story_id US-999")));
    }

    #[test]
    fn missing_trace_entry_flagged() {
        let req = req_set(
            vec![story("US-001")],
            vec![scenario("SC-001", "US-001")],
            BTreeMap::new(),
        );
        let (ok, violations) = check_trace(&req);
        assert!(!ok);
        assert!(
            violations
                .iter()
                .any(|v| v.contains("trace_map missing scenarios for story US-001"))
        );
    }

    #[test]
    fn dangling_trace_target_flagged() {
        let trace_map =
            BTreeMap::from([("US-001".to_string(), vec!["SC-404".to_string()])]);
        let req = req_set(
            vec![story("US-001")],
            vec![scenario("SC-001", "US-001")],
            trace_map,
        );
        let (ok, violations) = check_trace(&req);
        assert!(!ok);
        assert!(
            violations
                .iter()
                .any(|v| v.contains("missing scenario_id SC-404"))
        );
    }
}
