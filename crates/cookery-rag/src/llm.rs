//! OpenAI-compatible chat-completions client.
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use cookery_core::config::LlmConfig;
use cookery_core::error::{Error, Result};
use cookery_core::traits::Generator;

/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub struct OpenAiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Generation(format!("Failed to build HTTP client: {e}")))?;
        Self::with_http(config, api_key, http)
    }

    /// Use a caller-built HTTP client (proxy or TLS settings of its own).
    pub fn with_http(config: &LlmConfig, api_key: impl Into<String>, http: Client) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("LLM API key must not be empty".to_string()));
        }
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Key precedence: `llm.api_key` from configuration, then `OPENAI_API_KEY`.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .ok_or_else(|| Error::InvalidConfig(format!("no LLM API key: set llm.api_key or {API_KEY_ENV}")))?;
        Self::new(config, api_key)
    }
}

impl Generator for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        info!(url = %url, model = %self.model, prompt_chars = prompt.len(), "Requesting completion");

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
        };
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Generation(format!("Completion request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::Generation(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Error::Generation(error_message(status.as_u16(), &body)));
        }
        let answer = parse_completion(&body)?;
        debug!(answer_chars = answer.len(), "Completion received");
        Ok(answer)
    }
}

fn error_message(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string));
    match detail {
        Some(message) => format!("Completion request failed ({status}): {message}"),
        None => format!("Completion request failed ({status}): {body}"),
    }
}

/// Content of the first choice of a chat-completions response body.
fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| Error::Generation(format!("Invalid completion response: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| Error::Generation("Completion response has no content".to_string()))
}
