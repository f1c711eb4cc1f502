//! # req-llm
//!
//! Chat completion client for OpenAI-compatible APIs, in JSON mode.
//!
//! The [`Completion`] trait is the seam between the agents and the network:
//! agents are generic over it, so tests script completions without any HTTP.
//! [`LlmClient`] is the real implementation, posting to
//! `{base_url}/chat/completions` with `response_format: json_object`.

pub mod error;
pub mod http;

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::http::check_response;

/// A single JSON-mode chat completion.
///
/// Implementations return the raw content string of the first choice; the
/// caller deserializes and, if needed, drives a repair round-trip.
pub trait Completion {
    /// Send one system + user prompt pair, returning the model's content.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] on transport failure, API error, or an empty
    /// completion.
    fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f64,
    response_format: ResponseFormat<'a>,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// HTTP client for an OpenAI-compatible chat completions endpoint.
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
}

impl LlmClient {
    /// Create a client.
    ///
    /// `base_url` is the API root without a trailing slash, e.g.
    /// `https://api.openai.com/v1`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] if the API key is empty, or
    /// [`LlmError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: &str,
        model: &str,
        base_url: &str,
        temperature: f64,
        timeout_secs: u64,
    ) -> Result<Self, LlmError> {
        if api_key.is_empty() {
            return Err(LlmError::NotConfigured);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            temperature,
        })
    }

    /// The model name requests are sent with.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Completion for LlmClient {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        tracing::debug!(model = %self.model, "sending chat completion request");
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let resp = check_response(resp).await?;

        let data: ChatResponse = resp.json().await?;
        data.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LlmError::EmptyCompletion("no choices in response".to_string()))
    }
}
