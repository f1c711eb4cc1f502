//! # req-quality
//!
//! Deterministic quality checks for generated requirements. No LLM calls:
//! everything here is lexicon and structure based, so scores are
//! reproducible across runs.
//!
//! Checks fall in two tiers. Gherkin structure and traceability are *hard*
//! checks: any violation blocks acceptance. INVEST heuristics and the
//! ambiguity lexicon are *soft*: they only lower the score.

pub mod ambiguity;
pub mod gherkin;
pub mod invest;
pub mod report;
pub mod trace;

pub use ambiguity::detect_ambiguities;
pub use gherkin::{validate_all, validate_scenario};
pub use invest::score_story_invest;
pub use report::{QualityAssessment, build_quality_reports};
pub use trace::check_trace;
