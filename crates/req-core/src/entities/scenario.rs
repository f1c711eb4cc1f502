use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A Gherkin acceptance scenario belonging to exactly one user story.
///
/// Step lists are ordered; the validator requires at least one step in each
/// of `given`, `when`, and `then`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GherkinScenario {
    pub scenario_id: String,
    pub story_id: String,
    pub title: String,
    #[serde(default)]
    pub given: Vec<String>,
    #[serde(default)]
    pub when: Vec<String>,
    #[serde(default)]
    pub then: Vec<String>,
}

impl GherkinScenario {
    /// All steps in Gherkin order, for text scans that don't care which
    /// keyword a step sits under.
    pub fn all_steps(&self) -> impl Iterator<Item = &String> {
        self.given.iter().chain(&self.when).chain(&self.then)
    }
}
