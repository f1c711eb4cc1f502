use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A glossary entry attached to an epic. Terms defined here are exempt from
/// the undefined-term ambiguity checks and are quoted verbatim in prompts.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GlossaryTerm {
    pub term: String,
    pub definition: String,
}

/// A large unit of product requirement, submitted as free text plus optional
/// constraints and glossary. The pipeline decomposes it into user stories.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Epic {
    pub epic_id: String,
    pub text: String,
    #[serde(default)]
    pub glossary: Vec<GlossaryTerm>,
    #[serde(default)]
    pub constraints: Vec<String>,
}

impl Epic {
    /// Validate the non-empty fields a well-formed epic must carry.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `epic_id` or `text` is empty.
    pub fn validate(&self) -> Result<(), crate::errors::CoreError> {
        if self.epic_id.trim().is_empty() {
            return Err(crate::errors::CoreError::Validation(
                "epic_id must not be empty".into(),
            ));
        }
        if self.text.trim().is_empty() {
            return Err(crate::errors::CoreError::Validation(
                "epic text must not be empty".into(),
            ));
        }
        Ok(())
    }
}
