//! # req-agents
//!
//! The three LLM agents of the pipeline, plus the offline baseline:
//!
//! - [`generator`]: epic in, story/scenario bundle out (fresh or adapted
//!   from a cached draft)
//! - [`critic`]: reviews a set, emits edit instructions, never rewrites
//! - [`refiner`]: applies the critic's edits, emits a replacement bundle
//! - [`baseline`]: stub bundle with no network at all
//!
//! All agents are generic over [`req_llm::Completion`], so tests script
//! completions instead of hitting an API.

pub mod baseline;
pub mod critic;
pub mod error;
pub mod generator;
pub mod json;
pub mod prompts;
pub mod refiner;

#[cfg(test)]
pub(crate) mod test_support;

pub use baseline::generate_baseline;
pub use critic::critique;
pub use error::AgentError;
pub use generator::{GeneratedBundle, adapt_bundle, generate_bundle};
pub use refiner::refine;
