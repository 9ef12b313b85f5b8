//! Default values for Lonai configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Agent / LLM Defaults
// ============================================================================

/// Default agent provider.
pub const DEFAULT_AGENT_PROVIDER: &str = "anthropic";

/// Default max tokens for LLM responses.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Upper bound accepted for the sampling temperature.
pub const MAX_TEMPERATURE: f32 = 2.0;

// OpenAI defaults
/// Default OpenAI API URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

// Anthropic defaults
/// Default Anthropic API URL.
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
/// Default Anthropic model.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
/// Default Anthropic API version.
pub const DEFAULT_ANTHROPIC_API_VERSION: &str = "2023-06-01";

// Google defaults
/// Default Google Generative Language API URL.
pub const DEFAULT_GOOGLE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default Google model.
pub const DEFAULT_GOOGLE_MODEL: &str = "gemini-2.5-flash";

// DeepSeek defaults
/// Default DeepSeek (OpenAI-compatible) API URL.
pub const DEFAULT_DEEPSEEK_URL: &str = "https://api.deepseek.com/v1";
/// Default DeepSeek model.
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";

// ============================================================================
// Search Defaults
// ============================================================================

/// Default Tavily API URL.
pub const DEFAULT_TAVILY_URL: &str = "https://api.tavily.com";

/// Default number of search results per query.
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Maximum number of search results Tavily accepts per query.
pub const MAX_SEARCH_RESULTS: u32 = 10;

// ============================================================================
// Runtime Defaults
// ============================================================================

/// Default language for prompts and reports.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages with a dedicated system prompt.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "zh"];

/// Default timeout for outbound HTTP calls, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default tracing filter directive for the CLI.
pub const DEFAULT_LOG_FILTER: &str = "lonai=warn";

// ============================================================================
// Storage Defaults
// ============================================================================

/// Default directory for research records.
pub const DEFAULT_DATA_DIR: &str = "data/research";

/// Default record log file name.
pub const DEFAULT_RECORDS_FILE: &str = "records.jsonl";

/// Default directory for exported reports.
pub const DEFAULT_EXPORT_DIR: &str = "data/reports";

/// Default number of records shown by `history`.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Maximum length of the query-derived part of exported file names.
pub const DEFAULT_FILENAME_LENGTH: usize = 50;

// ============================================================================
// Config Files
// ============================================================================

/// Project-local config file name.
pub const LOCAL_CONFIG_FILE: &str = "lonai.toml";

/// Directory name under the user config directory.
pub const USER_CONFIG_DIR: &str = "lonai";

/// File name under the user config directory.
pub const USER_CONFIG_FILE: &str = "config.toml";
