use std::time::Duration;

use super::{ClaudeClient, GeminiClient, OpenAIClient, LLM};
use crate::config::{Config, ProviderKind};

/// LLM Provider configuration.
///
/// A closed set of backends; the variant is chosen once from [`Config`]
/// and turned into a client with [`Provider::build`].
#[derive(Debug, Clone)]
pub enum Provider {
    /// Anthropic Claude
    Anthropic { settings: ProviderSettings },
    /// OpenAI or any OpenAI-compatible endpoint
    OpenAI { settings: ProviderSettings },
    /// Google Gemini
    Google { settings: ProviderSettings },
    /// DeepSeek (OpenAI-compatible)
    DeepSeek { settings: ProviderSettings },
}

/// Settings shared by every provider variant.
#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Provider {
    /// Creates a provider from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let agent = &config.agent;
        let settings = ProviderSettings {
            api_key: agent.api_key.expose().to_string(),
            base_url: agent.base_url_or_default(),
            model: agent.model.clone(),
            temperature: agent.temperature,
            max_tokens: agent.max_tokens,
            timeout: config.timeout,
        };

        match agent.provider {
            ProviderKind::Anthropic => Provider::Anthropic { settings },
            ProviderKind::OpenAI => Provider::OpenAI { settings },
            ProviderKind::Google => Provider::Google { settings },
            ProviderKind::DeepSeek => Provider::DeepSeek { settings },
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::Anthropic { .. } => ProviderKind::Anthropic,
            Provider::OpenAI { .. } => ProviderKind::OpenAI,
            Provider::Google { .. } => ProviderKind::Google,
            Provider::DeepSeek { .. } => ProviderKind::DeepSeek,
        }
    }

    pub fn settings(&self) -> &ProviderSettings {
        match self {
            Provider::Anthropic { settings }
            | Provider::OpenAI { settings }
            | Provider::Google { settings }
            | Provider::DeepSeek { settings } => settings,
        }
    }

    /// Creates an LLM client from the provider configuration.
    pub fn build(self) -> Box<dyn LLM> {
        match self {
            Provider::Anthropic { settings } => Box::new(
                ClaudeClient::new(settings.api_key)
                    .with_api_url(messages_url(&settings.base_url))
                    .with_model(settings.model)
                    .with_temperature(settings.temperature)
                    .with_max_tokens(settings.max_tokens)
                    .with_timeout(settings.timeout),
            ),

            Provider::OpenAI { settings } => Box::new(openai_compatible(settings, "openai")),

            Provider::DeepSeek { settings } => Box::new(openai_compatible(settings, "deepseek")),

            Provider::Google { settings } => Box::new(
                GeminiClient::new(settings.api_key)
                    .with_base_url(settings.base_url)
                    .with_model(settings.model)
                    .with_temperature(settings.temperature)
                    .with_max_tokens(settings.max_tokens)
                    .with_timeout(settings.timeout),
            ),
        }
    }
}

fn openai_compatible(settings: ProviderSettings, name: &str) -> OpenAIClient {
    OpenAIClient::new(settings.base_url, settings.api_key, settings.model)
        .with_provider_name(name)
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens)
        .with_timeout(settings.timeout)
}

/// Anthropic's endpoint is the full messages URL; a bare base URL override
/// such as `https://proxy.example.com/v1` gets `/messages` appended.
fn messages_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/messages") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/messages")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> Config {
        Config::from_lookup(|key| match key {
            "AGENT_PROVIDER" => Some(provider.to_string()),
            "AGENT_API_KEY" => Some("test-key".to_string()),
            "TAVILY_API_KEY" => Some("tvly-key".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn test_from_config_selects_variant() {
        assert_eq!(Provider::from_config(&config("anthropic")).kind(), ProviderKind::Anthropic);
        assert_eq!(Provider::from_config(&config("custom")).kind(), ProviderKind::OpenAI);
        assert_eq!(Provider::from_config(&config("google")).kind(), ProviderKind::Google);
        assert_eq!(Provider::from_config(&config("deepseek")).kind(), ProviderKind::DeepSeek);
    }

    #[test]
    fn test_provider_defaults_applied() {
        let provider = Provider::from_config(&config("deepseek"));
        assert_eq!(provider.settings().base_url, "https://api.deepseek.com/v1");
        assert_eq!(provider.settings().model, "deepseek-chat");
    }

    #[test]
    fn test_build_reports_identity() {
        let llm = Provider::from_config(&config("deepseek")).build();
        assert_eq!(llm.provider_name(), "deepseek");
        assert_eq!(llm.model(), "deepseek-chat");

        let llm = Provider::from_config(&config("google")).build();
        assert_eq!(llm.provider_name(), "google");
    }

    #[test]
    fn test_messages_url() {
        assert_eq!(
            messages_url("https://api.anthropic.com/v1/messages"),
            "https://api.anthropic.com/v1/messages"
        );
        assert_eq!(
            messages_url("https://proxy.example.com/v1/"),
            "https://proxy.example.com/v1/messages"
        );
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let provider = Provider::from_config(&config("openai"));
        let debug = format!("{provider:?}");
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("[REDACTED]"));
    }
}
