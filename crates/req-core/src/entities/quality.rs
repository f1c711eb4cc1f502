use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// INVEST scores for a single story, each dimension on a 1 to 5 scale.
///
/// Serialized field names are the single capital letters the scorer and
/// exporters use (`{"I":5,"N":3,...}`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct InvestScores {
    #[serde(rename = "I")]
    pub independent: u8,
    #[serde(rename = "N")]
    pub negotiable: u8,
    #[serde(rename = "V")]
    pub valuable: u8,
    #[serde(rename = "E")]
    pub estimable: u8,
    #[serde(rename = "S")]
    pub small: u8,
    #[serde(rename = "T")]
    pub testable: u8,
}

impl InvestScores {
    /// Mean of the six dimensions.
    #[must_use]
    pub fn average(&self) -> f64 {
        f64::from(
            u32::from(self.independent)
                + u32::from(self.negotiable)
                + u32::from(self.valuable)
                + u32::from(self.estimable)
                + u32::from(self.small)
                + u32::from(self.testable),
        ) / 6.0
    }
}

/// Combined quality verdict for one story: INVEST scores, Gherkin validity of
/// the whole set, ambiguity hits, violation strings, and the penalty-adjusted
/// overall score in `[1.0, 5.0]`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct QualityReport {
    pub story_id: String,
    pub invest: InvestScores,
    pub gherkin_valid: bool,
    #[serde(default)]
    pub ambiguities: Vec<String>,
    #[serde(default)]
    pub violations: Vec<String>,
    pub overall_score: f64,
}
