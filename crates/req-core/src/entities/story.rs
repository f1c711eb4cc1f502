use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A requirement expressed from a user's perspective, generated from an epic.
///
/// `story_text` is the canonical "As a {role}, I want {goal}, so that
/// {benefit}" sentence; `role`/`goal`/`benefit` carry the parts separately so
/// the INVEST scorer can judge them individually.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UserStory {
    pub story_id: String,
    pub epic_id: String,
    pub role: String,
    pub goal: String,
    pub benefit: String,
    pub story_text: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub open_questions: Vec<String>,
}
