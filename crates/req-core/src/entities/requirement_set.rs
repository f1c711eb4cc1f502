use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Mode;

use super::{GherkinScenario, QualityReport, UserStory};

/// Provenance of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RunMetadata {
    pub run_id: String,
    pub epic_id: String,
    pub mode: Mode,
    pub iteration: u32,
    pub model_name: Option<String>,
    pub temperature: Option<f64>,
}

/// The full output of one run: stories, scenarios, the story→scenario trace
/// map, per-story quality reports, and run provenance.
///
/// `trace_map` is a `BTreeMap` so serialized output is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RequirementSet {
    pub epic_id: String,
    pub mode: Mode,
    pub stories: Vec<UserStory>,
    pub scenarios: Vec<GherkinScenario>,
    #[serde(default)]
    pub quality_reports: Vec<QualityReport>,
    pub trace_map: BTreeMap<String, Vec<String>>,
    pub run_metadata: RunMetadata,
}

impl RequirementSet {
    /// Scenarios traced to the given story, in trace-map order.
    #[must_use]
    pub fn scenarios_for_story(&self, story_id: &str) -> Vec<&GherkinScenario> {
        self.trace_map
            .get(story_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|sid| {
                        self.scenarios.iter().find(|sc| &sc.scenario_id == sid)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
