use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{snippet, ChatMessage, LLMError, Role, LLM};
use crate::config::{
    DEFAULT_DEEPSEEK_URL, DEFAULT_MAX_TOKENS, DEFAULT_OPENAI_URL, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS,
};

/// OpenAI-compatible API client.
///
/// Works with any provider that implements the OpenAI chat completions API:
/// - OpenAI
/// - DeepSeek
/// - Azure OpenAI
/// - vLLM
/// - OpenRouter
/// - Together AI
/// - Groq
/// - And many more
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    provider_name: String,
    client: Client,
}

impl OpenAIClient {
    /// Creates a new OpenAI-compatible client.
    ///
    /// # Arguments
    /// * `base_url` - The API base URL (e.g., "https://api.openai.com/v1")
    /// * `api_key` - The API key (can be empty for unauthenticated local servers)
    /// * `model` - The model name (e.g., "gpt-4o", "deepseek-chat")
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            provider_name: "openai".to_string(),
            client: Client::new(),
        }
    }

    /// Creates a client for OpenAI.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(DEFAULT_OPENAI_URL, api_key, model)
    }

    /// Creates a client for DeepSeek.
    pub fn deepseek(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(DEFAULT_DEEPSEEK_URL, api_key, model).with_provider_name("deepseek")
    }

    /// Sets the maximum tokens for responses.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the name reported by [`LLM::provider_name`].
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
    }

    async fn send_request(&self, messages: &[ChatMessage]) -> Result<String, LLMError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| RequestMessage {
                    role: m.role,
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        let url = format!("{}/chat/completions", self.base_url);

        let mut req = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .timeout(self.timeout);

        // Only add authorization if api_key is not empty
        if !self.api_key.is_empty() {
            req = req.header("authorization", format!("Bearer {}", self.api_key));
        }

        let response = req.json(&request).send().await?;

        let status = response.status();

        if status == 429 {
            warn!(provider = %self.provider_name, "rate limited");
            return Err(LLMError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message: snippet(&error_text),
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        debug!(provider = %self.provider_name, model = %self.model, "chat completion received");

        // Reasoning models may leave `content` empty and put the answer in
        // `reasoning_content`.
        let message = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or(LLMError::EmptyResponse)?;

        let content = message
            .content
            .filter(|c| !c.trim().is_empty())
            .or(message.reasoning_content.filter(|c| !c.trim().is_empty()))
            .ok_or(LLMError::EmptyResponse)?;

        Ok(content)
    }
}

#[async_trait]
impl LLM for OpenAIClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LLMError> {
        self.send_request(messages).await
    }

    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<RequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: Role,
    content: String,
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
    #[serde(default)]
    reasoning_content: Option<String>,
}
