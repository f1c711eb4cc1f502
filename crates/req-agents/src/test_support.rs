//! Shared test utilities for agent tests.

use std::sync::Mutex;

use req_core::entities::Epic;
use req_llm::Completion;
use req_llm::error::LlmError;

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

pub fn sample_epic() -> Epic {
    Epic {
        epic_id: "E-AUTH".to_string(),
        text: "Users can manage their own accounts.".to_string(),
        glossary: vec![],
        constraints: vec![],
    }
}
