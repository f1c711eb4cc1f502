use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EditAction, IssueType};

/// One concrete change the critic wants the refiner to apply.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EditInstruction {
    pub issue_type: IssueType,
    /// Existing story or scenario ID (`US-xxx` / `SC-xxx`).
    pub target_id: String,
    pub action: EditAction,
    pub rationale: String,
    /// Concrete instructions the refiner must apply.
    pub patch_guidance: String,
}

/// The critic's verdict on a requirement set. The critic never rewrites
/// stories itself; it emits edit instructions for the refiner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Critique {
    pub should_iterate: bool,
    pub summary: String,
    #[serde(default)]
    pub edits: Vec<EditInstruction>,
}
