//! Configuration management for Lonai.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the working directory (never overrides set variables)
//! 3. Project-local `lonai.toml`, or `~/.config/lonai/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! The resolved [`Config`] is built once per process and passed explicitly
//! into every component constructor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::export::ExportFormat;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Unsupported agent provider '{0}' (expected one of: anthropic, openai, google, deepseek)")]
    InvalidProvider(String),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to load .env file: {0}")]
    DotEnv(String),
}

impl ConfigError {
    fn missing(key: &str) -> Self {
        ConfigError::Missing {
            key: key.to_string(),
        }
    }

    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// The closed set of LLM backends Lonai can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Google,
    DeepSeek,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Google => "google",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    /// Provider-specific environment variable consulted when
    /// `AGENT_API_KEY` is not set.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Google => "GOOGLE_API_KEY",
            ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => DEFAULT_ANTHROPIC_MODEL,
            ProviderKind::OpenAI => DEFAULT_OPENAI_MODEL,
            ProviderKind::Google => DEFAULT_GOOGLE_MODEL,
            ProviderKind::DeepSeek => DEFAULT_DEEPSEEK_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => DEFAULT_ANTHROPIC_URL,
            ProviderKind::OpenAI => DEFAULT_OPENAI_URL,
            ProviderKind::Google => DEFAULT_GOOGLE_URL,
            ProviderKind::DeepSeek => DEFAULT_DEEPSEEK_URL,
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" | "openai-compatible" | "custom" => Ok(ProviderKind::OpenAI),
            "google" | "gemini" => Ok(ProviderKind::Google),
            "deepseek" | "deepseek-compatible" => Ok(ProviderKind::DeepSeek),
            _ => Err(ConfigError::InvalidProvider(s.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tavily search topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchTopic {
    #[default]
    General,
    News,
    Finance,
}

impl SearchTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchTopic::General => "general",
            SearchTopic::News => "news",
            SearchTopic::Finance => "finance",
        }
    }
}

impl FromStr for SearchTopic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(SearchTopic::General),
            "news" => Ok(SearchTopic::News),
            "finance" => Ok(SearchTopic::Finance),
            other => Err(ConfigError::invalid(
                "SEARCH_TOPIC",
                format!("'{other}' is not one of general, news, finance"),
            )),
        }
    }
}

/// An API key. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `***` followed by the last four characters.
    pub fn redacted(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("***{tail}")
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// LLM provider configuration.
    pub agent: AgentConfig,

    /// Tavily search configuration.
    pub search: SearchConfig,

    /// Record store configuration.
    pub storage: StorageConfig,

    /// Report export configuration.
    pub export: ExportConfig,

    /// Default research language.
    pub language: String,

    /// Timeout applied to every outbound HTTP call.
    pub timeout: Duration,

    /// Tracing filter directive.
    pub log_filter: String,

    /// File that also receives log output, when set.
    pub log_file: Option<PathBuf>,
}

/// LLM provider configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub provider: ProviderKind,
    pub api_key: Secret,
    /// Base URL override; `None` means the provider default.
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl AgentConfig {
    /// Get the base URL, falling back to provider defaults.
    pub fn base_url_or_default(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }
}

/// Tavily search configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: Secret,
    pub base_url: String,
    pub max_results: u32,
    pub topic: SearchTopic,
    /// Ask the search API for its own short answer alongside the results.
    pub include_answer: bool,
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the record log.
    pub data_dir: PathBuf,

    /// Record log file name.
    pub records_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            records_file: DEFAULT_RECORDS_FILE.to_string(),
        }
    }
}

impl StorageConfig {
    /// Storage rooted at `dir`, with the default file name.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Get the full path to the record log.
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(&self.records_file)
    }
}

/// Export configuration.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub default_format: ExportFormat,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            default_format: ExportFormat::Markdown,
        }
    }
}

/// Optional TOML configuration file.
///
/// ```toml
/// language = "en"
///
/// [agent]
/// provider = "openai"
/// model = "gpt-4o"
///
/// [search]
/// max_results = 8
///
/// [storage]
/// data_dir = "data/research"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub language: Option<String>,
    pub timeout_secs: Option<u64>,
    pub log: Option<String>,
    pub log_file: Option<PathBuf>,
    pub agent: FileAgentConfig,
    pub search: FileSearchConfig,
    pub storage: FileStorageConfig,
    pub export: FileExportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSearchConfig {
    pub base_url: Option<String>,
    pub max_results: Option<u32>,
    pub topic: Option<String>,
    pub include_answer: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExportConfig {
    pub output_dir: Option<PathBuf>,
    pub default_format: Option<String>,
}

impl FileConfig {
    /// Searches for a config file in order:
    /// 1. `./lonai.toml` (project local)
    /// 2. `~/.config/lonai/config.toml` (user config)
    /// 3. Falls back to an empty file config
    pub fn discover() -> Result<Self, ConfigError> {
        if Path::new(LOCAL_CONFIG_FILE).exists() {
            return Self::from_file(LOCAL_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE);
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load a config file from a specific path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }
}

impl Config {
    /// Load configuration from the process environment, `.env` and the
    /// optional config file.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(ConfigError::DotEnv(e.to_string())),
        }

        let file = FileConfig::discover()?;
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Build a configuration from a key lookup alone, ignoring config files.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(FileConfig::default(), lookup)
    }

    /// Merge a file config with a key lookup; the lookup wins.
    ///
    /// Blank values are treated as unset.
    pub fn resolve<F>(file: FileConfig, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider: ProviderKind = get("AGENT_PROVIDER")
            .or(file.agent.provider)
            .ok_or_else(|| ConfigError::missing("AGENT_PROVIDER"))?
            .parse()?;

        let api_key = get("AGENT_API_KEY")
            .or_else(|| get(provider.key_env_var()))
            .or(file.agent.api_key)
            .ok_or_else(|| ConfigError::missing("AGENT_API_KEY"))?;

        let tavily_key =
            get("TAVILY_API_KEY").ok_or_else(|| ConfigError::missing("TAVILY_API_KEY"))?;

        let base_url = get("AGENT_BASE_URL").or(file.agent.base_url);
        if let Some(url) = &base_url {
            validate_url("AGENT_BASE_URL", url)?;
        }

        let model = get("AGENT_MODEL")
            .or(file.agent.model)
            .unwrap_or_else(|| provider.default_model().to_string());

        let temperature = match get("AGENT_TEMPERATURE") {
            Some(raw) => parse_number("AGENT_TEMPERATURE", &raw)?,
            None => file.agent.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        };
        if !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(ConfigError::invalid(
                "AGENT_TEMPERATURE",
                format!("{temperature} is outside 0.0..={MAX_TEMPERATURE}"),
            ));
        }

        let max_tokens = match get("AGENT_MAX_TOKENS") {
            Some(raw) => parse_number("AGENT_MAX_TOKENS", &raw)?,
            None => file.agent.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };
        if max_tokens == 0 {
            return Err(ConfigError::invalid("AGENT_MAX_TOKENS", "must be greater than 0"));
        }

        let max_results = match get("SEARCH_MAX_RESULTS") {
            Some(raw) => parse_number("SEARCH_MAX_RESULTS", &raw)?,
            None => file.search.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
        };
        if !(1..=MAX_SEARCH_RESULTS).contains(&max_results) {
            return Err(ConfigError::invalid(
                "SEARCH_MAX_RESULTS",
                format!("{max_results} is outside 1..={MAX_SEARCH_RESULTS}"),
            ));
        }

        let topic = match get("SEARCH_TOPIC").or(file.search.topic) {
            Some(raw) => raw.parse()?,
            None => SearchTopic::default(),
        };

        let include_answer = match get("SEARCH_INCLUDE_ANSWER") {
            Some(raw) => parse_flag("SEARCH_INCLUDE_ANSWER", &raw)?,
            None => file.search.include_answer.unwrap_or(false),
        };

        let search_base_url = get("TAVILY_BASE_URL")
            .or(file.search.base_url)
            .unwrap_or_else(|| DEFAULT_TAVILY_URL.to_string());
        validate_url("TAVILY_BASE_URL", &search_base_url)?;

        let language = get("LONAI_LANGUAGE")
            .or(file.language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
            .to_lowercase();
        if !SUPPORTED_LANGUAGES.contains(&language.as_str()) {
            return Err(ConfigError::invalid(
                "LONAI_LANGUAGE",
                format!("'{language}' is not one of {}", SUPPORTED_LANGUAGES.join(", ")),
            ));
        }

        let timeout_secs = match get("LONAI_TIMEOUT_SECS") {
            Some(raw) => parse_number("LONAI_TIMEOUT_SECS", &raw)?,
            None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(ConfigError::invalid("LONAI_TIMEOUT_SECS", "must be greater than 0"));
        }

        let data_dir = get("LONAI_DATA_DIR")
            .map(PathBuf::from)
            .or(file.storage.data_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let output_dir = get("LONAI_EXPORT_DIR")
            .map(PathBuf::from)
            .or(file.export.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR));

        let default_format = match get("LONAI_EXPORT_FORMAT").or(file.export.default_format) {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::invalid("LONAI_EXPORT_FORMAT", format!("{e}")))?,
            None => ExportFormat::Markdown,
        };

        let log_filter = get("LONAI_LOG")
            .or(file.log)
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let log_file = get("LONAI_LOG_FILE").map(PathBuf::from).or(file.log_file);

        Ok(Self {
            agent: AgentConfig {
                provider,
                api_key: Secret::new(api_key),
                base_url,
                model,
                temperature,
                max_tokens,
            },
            search: SearchConfig {
                api_key: Secret::new(tavily_key),
                base_url: search_base_url,
                max_results,
                topic,
                include_answer,
            },
            storage: StorageConfig {
                data_dir,
                records_file: DEFAULT_RECORDS_FILE.to_string(),
            },
            export: ExportConfig {
                output_dir,
                default_format,
            },
            language,
            timeout: Duration::from_secs(timeout_secs),
            log_filter,
            log_file,
        })
    }

    /// Human-readable view of the active configuration with secrets masked.
    pub fn redacted(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Agent Provider", self.agent.provider.to_string()),
            ("Agent Model", self.agent.model.clone()),
            (
                "Agent Base URL",
                self.agent
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "Default".to_string()),
            ),
            ("Agent Temperature", self.agent.temperature.to_string()),
            ("Agent Max Tokens", self.agent.max_tokens.to_string()),
            ("Agent API Key", self.agent.api_key.redacted()),
            ("Tavily API Key", self.search.api_key.redacted()),
            ("Max Search Results", self.search.max_results.to_string()),
            ("Search Topic", self.search.topic.as_str().to_string()),
            ("Include Search Answer", self.search.include_answer.to_string()),
            ("Language", self.language.clone()),
            ("Timeout", format!("{}s", self.timeout.as_secs())),
            ("Storage Directory", self.storage.data_dir.display().to_string()),
            ("Export Directory", self.export.output_dir.display().to_string()),
            ("Export Format", self.export.default_format.as_str().to_string()),
            ("Log Filter", self.log_filter.clone()),
            (
                "Log File",
                self.log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "Not set".to_string()),
            ),
        ]
    }
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, format!("'{raw}': {e}")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, format!("'{raw}' is not a boolean"))),
    }
}

fn validate_url(key: &str, raw: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::invalid(key, format!("'{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::invalid(key, format!("unsupported scheme '{other}'"))),
    }
}
