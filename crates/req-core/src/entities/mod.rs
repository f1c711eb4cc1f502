//! Entity structs for the requirements domain.

mod critique;
mod epic;
mod quality;
mod requirement_set;
mod scenario;
mod story;

pub use critique::{Critique, EditInstruction};
pub use epic::{Epic, GlossaryTerm};
pub use quality::{InvestScores, QualityReport};
pub use requirement_set::{RequirementSet, RunMetadata};
pub use scenario::GherkinScenario;
pub use story::UserStory;
