//! Per-story quality reports and the set-level score.

use req_core::entities::{QualityReport, RequirementSet};

use crate::ambiguity::detect_ambiguities;
use crate::gherkin::validate_all;
use crate::invest::score_story_invest;
use crate::trace::check_trace;

/// The full quality picture for one requirement set.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityAssessment {
    /// One report per story, in story order.
    pub reports: Vec<QualityReport>,
    /// True when no hard (Gherkin or traceability) violations exist.
    pub hard_ok: bool,
    /// All hard violations across the set.
    pub hard_violations: Vec<String>,
    /// Mean of per-story overall scores, 0.0 for an empty set.
    pub avg_score: f64,
}

/// Score every story in a requirement set.
///
/// Per story: the INVEST average on a 1-5 scale, minus 0.2 per INVEST
/// issue, 0.3 per hard violation mentioning the story, and 0.05 per
/// ambiguity mentioning it, clamped to [1.0, 5.0].
#[must_use]
pub fn build_quality_reports(req: &RequirementSet) -> QualityAssessment {
    let (gherkin_ok, gherkin_violations) = validate_all(&req.scenarios);
    let (trace_ok, trace_violations) = check_trace(req);
    let hard_ok = gherkin_ok && trace_ok;

    let mut hard_violations = gherkin_violations;
    hard_violations.extend(trace_violations);

    let ambiguities = detect_ambiguities(&req.stories, &req.scenarios);

    let mut reports = Vec::with_capacity(req.stories.len());
    let mut total = 0.0;

    for story in &req.stories {
        let (invest, invest_issues) = score_story_invest(story, &req.scenarios);

        let invest_avg = invest.average();
        let mentioning = |items: &[String]| -> usize {
            items
                .iter()
                .filter(|item| item.contains(&story.story_id))
                .count()
        };
        #[allow(clippy::cast_precision_loss)]
        let penalty = 0.2 * invest_issues.len() as f64
            + 0.3 * mentioning(&hard_violations) as f64
            + 0.05 * mentioning(&ambiguities) as f64;
        let overall_score = (invest_avg - penalty).clamp(1.0, 5.0);

        let mut violations = invest_issues;
        violations.extend(hard_violations.iter().cloned());

        total += overall_score;
        reports.push(QualityReport {
            story_id: story.story_id.clone(),
            invest,
            gherkin_valid: gherkin_ok,
            ambiguities: ambiguities.clone(),
            violations,
            overall_score,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_score = if reports.is_empty() {
        0.0
    } else {
        total / reports.len() as f64
    };

    QualityAssessment {
        reports,
        hard_ok,
        hard_violations,
        avg_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use req_core::entities::{GherkinScenario, RunMetadata, UserStory};
    use req_core::enums::Mode;

    fn clean_set() -> RequirementSet {
        let story = UserStory {
            story_id: "US-001".to_string(),
            epic_id: "E-1".to_string(),
            role: "registered user".to_string(),
            goal: "reset my password".to_string(),
            benefit: "I regain access".to_string(),
            story_text: "As a registered user, I want to reset my password so that I regain access."
                .to_string(),
            assumptions: vec![],
            open_questions: vec![],
        };
        let scenario = GherkinScenario {
            scenario_id: "SC-001".to_string(),
            story_id: "US-001".to_string(),
            title: "Reset link is sent".to_string(),
            given: vec!["a registered user with a verified email".to_string()],
            when: vec!["they request a password reset".to_string()],
            then: vec!["a reset link is emailed within 5 minutes".to_string()],
        };
        RequirementSet {
            epic_id: "E-1".to_string(),
            mode: Mode::Agentic,
            stories: vec![story],
            scenarios: vec![scenario],
            quality_reports: vec![],
            trace_map: BTreeMap::from([("US-001".to_string(), vec!["SC-001".to_string()])]),
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
    fn clean_set_scores_well() {
        let assessment = build_quality_reports(&clean_set());
        assert!(assessment.hard_ok, "{:?}", assessment.hard_violations);
        assert_eq!(assessment.reports.len(), 1);

        // INVEST (5,5,5,5,5,4) averages to 29/6 with no penalties
        let report = &assessment.reports[0];
        assert!((report.overall_score - 29.0 / 6.0).abs() < 1e-9);
        assert!((assessment.avg_score - report.overall_score).abs() < 1e-9);
    }

    #[test]
    fn hard_violation_lowers_score_and_flags() {
        let mut req = clean_set();
        req.scenarios[0].then.clear();
        let assessment = build_quality_reports(&req);

        assert!(!assessment.hard_ok);
        assert!(!assessment.hard_violations.is_empty());
        let clean_score = build_quality_reports(&clean_set()).reports[0].overall_score;
        assert!(assessment.reports[0].overall_score < clean_score);
    }

    #[test]
    fn ambiguity_applies_small_penalty() {
        let mut req = clean_set();
        req.stories[0].assumptions = vec!["US-001 setup is normally done".to_string()];
        let assessment = build_quality_reports(&req);

        let clean_score = build_quality_reports(&clean_set()).reports[0].overall_score;
        let diff = clean_score - assessment.reports[0].overall_score;
        assert!((diff - 0.05).abs() < 1e-9, "diff was {diff}");
    }

    #[test]
    fn empty_set_scores_zero() {
        let mut req = clean_set();
        req.stories.clear();
        req.scenarios.clear();
        req.trace_map.clear();
        let assessment = build_quality_reports(&req);
        assert!(assessment.reports.is_empty());
        assert!((assessment.avg_score - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_never_drops_below_one() {
        let mut req = clean_set();
        req.stories[0].story_text =
            "This depends on the database and requires various appropriate handling, etc."
                .to_string();
        req.scenarios[0].then = vec!["it should work appropriately".to_string()];
        let assessment = build_quality_reports(&req);
        assert!(assessment.reports[0].overall_score >= 1.0);
    }
}
