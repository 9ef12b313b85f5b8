mod claude;
mod error;
mod gemini;
mod openai;
mod provider;

pub use claude::ClaudeClient;
pub use error::LLMError;
pub use gemini::GeminiClient;
pub use openai::OpenAIClient;
pub use provider::Provider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a conversation sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Trait for Large Language Model providers.
///
/// Each provider is one variant of [`Provider`], selected once at startup
/// and used through this single capability.
///
/// # Supported Providers
///
/// - **Anthropic**: Claude models via the Messages API
/// - **OpenAI-compatible**: OpenAI, Azure, vLLM, OpenRouter and other
///   endpoints speaking the chat completions API
/// - **Google**: Gemini models via the Generative Language API
/// - **DeepSeek**: DeepSeek's OpenAI-compatible endpoint
///
/// # Example
///
/// ```ignore
/// use lonai_core::llm::{ChatMessage, Provider, LLM};
///
/// let llm = Provider::from_config(&config).build();
/// let text = llm.generate(&[ChatMessage::user("Hello!")]).await?;
/// ```
#[async_trait]
pub trait LLM: Send + Sync {
    /// Generate a reply to a conversation.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LLMError>;

    /// Provider name, e.g. `anthropic`.
    fn provider_name(&self) -> &str;

    /// Model identifier sent to the provider.
    fn model(&self) -> &str;

    /// Complete a single prompt.
    async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        self.generate(&[ChatMessage::user(prompt)]).await
    }

    /// Complete a prompt with a system message.
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LLMError> {
        self.generate(&[ChatMessage::system(system), ChatMessage::user(prompt)])
            .await
    }
}

/// Blanket implementation for boxed trait objects.
#[async_trait]
impl LLM for Box<dyn LLM> {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LLMError> {
        (**self).generate(messages).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

/// Joins all system messages into one instruction, for providers that take
/// the system prompt outside the message list.
pub(crate) fn split_system(messages: &[ChatMessage]) -> (Option<String>, Vec<&ChatMessage>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let rest = messages.iter().filter(|m| m.role != Role::System).collect();

    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    (system, rest)
}

/// Shortens an error body for inclusion in error messages.
pub(crate) fn snippet(text: &str) -> String {
    const MAX: usize = 500;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_system() {
        let messages = vec![
            ChatMessage::system("a"),
            ChatMessage::user("q"),
            ChatMessage::system("b"),
        ];
        let (system, rest) = split_system(&messages);
        assert_eq!(system.as_deref(), Some("a\n\nb"));
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].role, Role::User);
    }

    #[test]
    fn test_snippet() {
        assert_eq!(snippet("short"), "short");
        assert!(snippet(&"x".repeat(600)).ends_with("..."));
    }
}
