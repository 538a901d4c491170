//! The abstract boundary to a remote generative model, and an HTTP-backed
//! implementation of it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt_parts: Vec<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub response_schema: Value,
}

#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub text: String,
    pub raw_bytes: Vec<u8>,
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ModelError>;
}

/// A JSON-over-HTTP chat-completions-shaped client. The request body
/// follows the common `{model, messages, temperature, top_p,
/// max_tokens, response_format}` shape used by OpenAI-compatible
/// generative endpoints.
pub struct HttpGenerativeModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpGenerativeModel {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .expect("reqwest client builds with static config");
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    json_schema: &'a Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl GenerativeModel for HttpGenerativeModel {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ModelError> {
        let content = request.prompt_parts.join("\n\n");
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &content,
            }],
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: &request.response_schema,
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        let raw_bytes = response
            .bytes()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?
            .to_vec();

        if !status.is_success() {
            return Err(ModelError::Provider(format!(
                "status {status}: {}",
                String::from_utf8_lossy(&raw_bytes)
            )));
        }

        let parsed: ChatResponse = serde_json::from_slice(&raw_bytes)
            .map_err(|e| ModelError::Provider(format!("unparseable response envelope: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ModelError::Provider("empty choices array".into()))?;

        Ok(GenerateResponse { text, raw_bytes })
    }
}
