//! Status enums, generation modes, and critique action types for ReqSmith.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! unless the LLM wire format dictates otherwise (`IssueType` keeps the
//! `INVEST_*` spellings the critic prompt asks for). Status enums with state
//! machines provide `allowed_next_states()` to enforce valid transitions at
//! the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// How a requirement set was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Hand-written reference set (imported, never generated).
    Human,
    /// Single LLM completion, no critique loop.
    LlmBaseline,
    /// Full generate → critique → refine loop.
    Agentic,
}

impl Mode {
    /// String representation used in SQL storage and run folder paths.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::LlmBaseline => "llm_baseline",
            Self::Agentic => "agentic",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EpicStatus
// ---------------------------------------------------------------------------

/// Lifecycle of an epic.
///
/// ```text
/// submitted → decomposed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EpicStatus {
    Submitted,
    Decomposed,
}

impl EpicStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Submitted => &[Self::Decomposed],
            Self::Decomposed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Decomposed => "decomposed",
        }
    }
}

impl fmt::Display for EpicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StoryStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a user story. Scenarios mirror their parent story's status.
///
/// ```text
/// generated → validated
///           → rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Generated,
    Validated,
    Rejected,
}

impl StoryStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Generated => &[Self::Validated, Self::Rejected],
            Self::Validated | Self::Rejected => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Validated => "validated",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueType
// ---------------------------------------------------------------------------

/// Category of an issue raised by the critic.
///
/// Serialized spellings match what the critic prompt asks the model to emit,
/// so these are not `snake_case`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum IssueType {
    #[serde(rename = "INVEST_Independent")]
    InvestIndependent,
    #[serde(rename = "INVEST_Negotiable")]
    InvestNegotiable,
    #[serde(rename = "INVEST_Valuable")]
    InvestValuable,
    #[serde(rename = "INVEST_Estimable")]
    InvestEstimable,
    #[serde(rename = "INVEST_Small")]
    InvestSmall,
    #[serde(rename = "INVEST_Testable")]
    InvestTestable,
    #[serde(rename = "Gherkin_Structure")]
    GherkinStructure,
    Ambiguity,
    Traceability,
    Other,
}

// ---------------------------------------------------------------------------
// EditAction
// ---------------------------------------------------------------------------

/// What the refiner should do to the target of an edit instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    RewriteStory,
    SplitStory,
    ReviseScenario,
    AddScenario,
    ClarifyAssumptions,
}

// ---------------------------------------------------------------------------
// CacheOutcome
// ---------------------------------------------------------------------------

/// How a semantic cache lookup resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheOutcome {
    /// Exact normalized-text hash match.
    Hash,
    /// Similarity at or above the reuse threshold; stored bundle returned as-is.
    SemanticReuse,
    /// Similarity in the adapt band; stored bundle used as a generation draft.
    SemanticAdapt,
    /// No close match; fresh generation.
    Miss,
}

impl CacheOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::SemanticReuse => "semantic_reuse",
            Self::SemanticAdapt => "semantic_adapt",
            Self::Miss => "miss",
        }
    }
}

impl fmt::Display for CacheOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
