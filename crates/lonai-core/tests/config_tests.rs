use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use lonai_core::config::{
    FileConfig, ProviderKind, SearchTopic, DEFAULT_DATA_DIR, DEFAULT_DEEPSEEK_MODEL,
    DEFAULT_EXPORT_DIR, DEFAULT_MAX_RESULTS, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_SECS,
};
use lonai_core::{Config, ConfigError, ExportFormat};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

const MINIMAL: &[(&str, &str)] = &[
    ("AGENT_PROVIDER", "deepseek"),
    ("AGENT_API_KEY", "sk-test-123456"),
    ("TAVILY_API_KEY", "tvly-abcdef"),
];

fn assert_missing(result: Result<Config, ConfigError>, expected: &str) {
    match result {
        Err(ConfigError::Missing { key }) => assert_eq!(key, expected),
        other => panic!("expected missing {expected}, got {other:?}"),
    }
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = Config::from_lookup(env(MINIMAL)).unwrap();

    assert_eq!(config.agent.provider, ProviderKind::DeepSeek);
    assert_eq!(config.agent.model, DEFAULT_DEEPSEEK_MODEL);
    assert_eq!(config.agent.max_tokens, DEFAULT_MAX_TOKENS);
    assert!(config.agent.base_url.is_none());
    assert_eq!(config.search.max_results, DEFAULT_MAX_RESULTS);
    assert_eq!(config.search.topic, SearchTopic::General);
    assert_eq!(config.language, "en");
    assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    assert_eq!(config.storage.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    assert_eq!(config.export.output_dir, PathBuf::from(DEFAULT_EXPORT_DIR));
    assert_eq!(config.export.default_format, ExportFormat::Markdown);
}

#[test]
fn test_each_required_key_is_reported() {
    assert_missing(
        Config::from_lookup(env(&[("AGENT_API_KEY", "k"), ("TAVILY_API_KEY", "t")])),
        "AGENT_PROVIDER",
    );
    assert_missing(
        Config::from_lookup(env(&[("AGENT_PROVIDER", "anthropic"), ("TAVILY_API_KEY", "t")])),
        "AGENT_API_KEY",
    );
    assert_missing(
        Config::from_lookup(env(&[("AGENT_PROVIDER", "anthropic"), ("AGENT_API_KEY", "k")])),
        "TAVILY_API_KEY",
    );
}

#[test]
fn test_openai_without_api_key_fails() {
    let result = Config::from_lookup(env(&[
        ("AGENT_PROVIDER", "openai"),
        ("TAVILY_API_KEY", "tvly-abcdef"),
    ]));
    assert_missing(result, "AGENT_API_KEY");
}

#[test]
fn test_blank_values_count_as_missing() {
    let result = Config::from_lookup(env(&[
        ("AGENT_PROVIDER", "openai"),
        ("AGENT_API_KEY", "   "),
        ("TAVILY_API_KEY", "tvly-abcdef"),
    ]));
    assert_missing(result, "AGENT_API_KEY");
}

#[test]
fn test_provider_specific_key_fallback() {
    let config = Config::from_lookup(env(&[
        ("AGENT_PROVIDER", "claude"),
        ("ANTHROPIC_API_KEY", "sk-ant-9999"),
        ("TAVILY_API_KEY", "tvly-abcdef"),
    ]))
    .unwrap();

    assert_eq!(config.agent.provider, ProviderKind::Anthropic);
    assert_eq!(config.agent.api_key.expose(), "sk-ant-9999");
}

#[test]
fn test_unknown_provider() {
    let result = Config::from_lookup(env(&[
        ("AGENT_PROVIDER", "ollama"),
        ("AGENT_API_KEY", "k"),
        ("TAVILY_API_KEY", "t"),
    ]));
    assert!(matches!(result, Err(ConfigError::InvalidProvider(p)) if p == "ollama"));
}

#[test]
fn test_out_of_range_values_rejected() {
    let cases = [
        ("AGENT_TEMPERATURE", "2.5"),
        ("AGENT_TEMPERATURE", "warm"),
        ("SEARCH_MAX_RESULTS", "0"),
        ("SEARCH_MAX_RESULTS", "11"),
        ("LONAI_LANGUAGE", "fr"),
        ("LONAI_TIMEOUT_SECS", "0"),
        ("AGENT_BASE_URL", "ftp://example.com"),
        ("SEARCH_TOPIC", "sports"),
        ("LONAI_EXPORT_FORMAT", "pdf"),
    ];

    for (key, value) in cases {
        let mut pairs = MINIMAL.to_vec();
        pairs.push((key, value));
        match Config::from_lookup(env(&pairs)) {
            Err(ConfigError::Invalid { key: k, .. }) => assert_eq!(k, key),
            other => panic!("{key}={value}: expected Invalid, got {other:?}"),
        }
    }
}

#[test]
fn test_environment_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
language = "zh"
timeout_secs = 30

[agent]
provider = "google"
model = "gemini-pro"

[search]
max_results = 3
topic = "news"

[export]
output_dir = "out/reports"
default_format = "html"
"#,
    )
    .unwrap();

    let config = Config::resolve(
        file,
        env(&[
            ("AGENT_API_KEY", "k-file-test"),
            ("TAVILY_API_KEY", "t"),
            ("AGENT_MODEL", "gemini-2.0-flash"),
            ("SEARCH_MAX_RESULTS", "7"),
        ]),
    )
    .unwrap();

    assert_eq!(config.agent.provider, ProviderKind::Google);
    assert_eq!(config.agent.model, "gemini-2.0-flash");
    assert_eq!(config.search.max_results, 7);
    assert_eq!(config.search.topic, SearchTopic::News);
    assert_eq!(config.language, "zh");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.export.output_dir, PathBuf::from("out/reports"));
    assert_eq!(config.export.default_format, ExportFormat::Html);
}

#[test]
fn test_logging_and_answer_settings() {
    let file: FileConfig = toml::from_str(
        r#"
log = "lonai=info"
log_file = "logs/lonai.log"

[search]
include_answer = true
"#,
    )
    .unwrap();

    let config = Config::resolve(file.clone(), env(MINIMAL)).unwrap();
    assert_eq!(config.log_filter, "lonai=info");
    assert_eq!(config.log_file, Some(PathBuf::from("logs/lonai.log")));
    assert!(config.search.include_answer);

    let mut pairs = MINIMAL.to_vec();
    pairs.extend([("LONAI_LOG", "lonai=trace"), ("SEARCH_INCLUDE_ANSWER", "no")]);
    let config = Config::resolve(file, env(&pairs)).unwrap();
    assert_eq!(config.log_filter, "lonai=trace");
    assert!(!config.search.include_answer);

    let defaults = Config::from_lookup(env(MINIMAL)).unwrap();
    assert_eq!(defaults.log_filter, "lonai=warn");
    assert!(defaults.log_file.is_none());
    assert!(!defaults.search.include_answer);
}

#[test]
fn test_invalid_flag_rejected() {
    let mut pairs = MINIMAL.to_vec();
    pairs.push(("SEARCH_INCLUDE_ANSWER", "maybe"));
    assert!(matches!(
        Config::from_lookup(env(&pairs)),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn test_redacted_view_hides_secrets() {
    let config = Config::from_lookup(env(MINIMAL)).unwrap();
    let view = config.redacted();

    let rendered: Vec<String> = view.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    let joined = rendered.join("\n");

    assert!(!joined.contains("sk-test-123456"));
    assert!(!joined.contains("tvly-abcdef"));
    assert!(joined.contains("Agent API Key: ***3456"));
    assert!(joined.contains("Tavily API Key: ***cdef"));
    assert!(joined.contains("Agent Provider: deepseek"));
}

#[test]
fn test_debug_output_hides_secrets() {
    let config = Config::from_lookup(env(MINIMAL)).unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("sk-test-123456"));
    assert!(!debug.contains("tvly-abcdef"));
}
