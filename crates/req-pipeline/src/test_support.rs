//! Shared test utilities for pipeline tests.

use std::sync::Mutex;

use req_core::entities::Epic;
use req_embeddings::{Embedder, EmbeddingError};
use req_llm::Completion;
use req_llm::error::LlmError;

/// A well-formed single-story bundle used as a canned completion.
pub const BUNDLE_JSON: &str = r#"{
    "stories": [{
        "story_id": "US-001",
        "epic_id": "E-AUTH",
        "role": "registered user",
        "goal": "reset my password",
        "benefit": "I regain access",
        "story_text": "As a registered user, I want to reset my password so that I regain access."
    }],
    "scenarios": [{
        "scenario_id": "SC-001",
        "story_id": "US-001",
        "title": "Reset link is sent",
        "given": ["a registered user with a verified email"],
        "when": ["they request a password reset"],
        "then": ["a reset link is emailed within 5 minutes"]
    }],
    "trace_map": {"US-001": ["SC-001"]}
}"#;

/// Scripted completion: pops canned responses in order, records every
/// user prompt it was sent.
pub struct Scripted {
    responses: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl Scripted {
    pub fn new(responses: &[&str]) -> Self {
        let mut responses: Vec<String> = responses.iter().map(ToString::to_string).collect();
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// User prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Completion for Scripted {
    async fn complete_json(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(user_prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| LlmError::EmptyCompletion("script exhausted".to_string()))
    }
}

/// Embedder that returns the same vector for every text.
pub struct StubEmbedder {
    vector: Vec<f32>,
}

impl StubEmbedder {
    pub fn new(vector: &[f32]) -> Self {
        Self {
            vector: vector.to_vec(),
        }
    }
}

impl Embedder for StubEmbedder {
    fn embed(&mut self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vector.clone())
    }
}

pub fn sample_epic() -> Epic {
    Epic {
        epic_id: "E-AUTH".to_string(),
        text: "Users can manage their own accounts.".to_string(),
        glossary: vec![],
        constraints: vec![],
    }
}
