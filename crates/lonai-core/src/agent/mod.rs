//! The agent that turns a question into a sourced research report.
//!
//! [`AgentFramework`] is the seam the orchestrator drives. The built-in
//! [`SearchAgent`] runs one search, then asks the LLM to synthesize a
//! report from the numbered results.

pub mod prompts;

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::llm::{LLMError, LLM};
use crate::research::{SourceReference, TraceStep};
use crate::search::{SearchClient, SearchError, SearchResponse};

use prompts::{build_research_prompt, system_prompt};

/// Errors raised while the agent is working.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Search failed: {0}")]
    Search(#[from] SearchError),

    #[error("LLM error: {0}")]
    LLM(#[from] LLMError),
}

impl AgentError {
    /// Rate limits, 5xx responses, network failures and timeouts are retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Search(e) => e.is_retryable(),
            AgentError::LLM(e) => e.is_retryable(),
        }
    }
}

/// A single question for the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRequest {
    pub query: String,
    pub language: String,
}

impl AgentRequest {
    pub fn new(query: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: language.into(),
        }
    }
}

/// What the agent produced for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentOutput {
    pub response: String,
    pub sources: Vec<SourceReference>,
    pub trace: Vec<TraceStep>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

/// Anything that can answer a research question.
#[async_trait]
pub trait AgentFramework: Send + Sync {
    async fn run(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError>;
}

#[async_trait]
impl AgentFramework for Box<dyn AgentFramework> {
    async fn run(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        (**self).run(request).await
    }
}

/// Search-then-synthesize research agent.
pub struct SearchAgent<S: SearchClient, L: LLM> {
    search: S,
    llm: L,
}

impl<S: SearchClient, L: LLM> SearchAgent<S, L> {
    pub fn new(search: S, llm: L) -> Self {
        Self { search, llm }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }
}

#[async_trait]
impl<S: SearchClient, L: LLM> AgentFramework for SearchAgent<S, L> {
    async fn run(&self, request: &AgentRequest) -> Result<AgentOutput, AgentError> {
        let mut trace = Vec::new();

        // 1. Search the web
        let results = self.search.search(&request.query).await?;
        trace.push(TraceStep::new(
            "search",
            format!("{} results for \"{}\"", results.results.len(), request.query),
        ));

        // 2. Build prompt
        let prompt = build_research_prompt(&request.query, &results);
        debug!(chars = prompt.len(), "research prompt built");

        // 3. Call LLM
        let response = self
            .llm
            .complete_with_system(system_prompt(&request.language), &prompt)
            .await?;
        trace.push(TraceStep::new(
            "synthesize",
            format!("{} / {}", self.llm.provider_name(), self.llm.model()),
        ));

        info!(
            sources = results.results.len(),
            provider = self.llm.provider_name(),
            "agent run complete"
        );

        Ok(AgentOutput {
            response,
            sources: collect_sources(&results),
            trace,
            provider: Some(self.llm.provider_name().to_string()),
            model: Some(self.llm.model().to_string()),
        })
    }
}

/// Keeps hits with an http(s) URL, first occurrence of each URL only.
fn collect_sources(results: &SearchResponse) -> Vec<SourceReference> {
    let mut seen = HashSet::new();
    results
        .results
        .iter()
        .filter(|hit| seen.insert(hit.url.clone()))
        .filter_map(|hit| SourceReference::new(hit.url.as_str(), hit.title.trim()).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;
    use crate::search::SearchHit;
    use std::sync::Mutex;

    struct FixedSearch(SearchResponse);

    #[async_trait]
    impl SearchClient for FixedSearch {
        async fn search(&self, _query: &str) -> Result<SearchResponse, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchClient for FailingSearch {
        async fn search(&self, _query: &str) -> Result<SearchResponse, SearchError> {
            Err(SearchError::Unauthorized)
        }
    }

    #[derive(Default)]
    struct RecordingLLM {
        seen: Mutex<Vec<ChatMessage>>,
    }

    #[async_trait]
    impl LLM for RecordingLLM {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LLMError> {
            self.seen.lock().unwrap().extend(messages.iter().cloned());
            Ok("# Report\n\nFindings [1]".to_string())
        }

        fn provider_name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-1"
        }
    }

    fn hit(url: &str, title: &str) -> SearchHit {
        SearchHit {
            title: title.to_string(),
            url: url.to_string(),
            content: "content".to_string(),
            score: 0.5,
        }
    }

    #[tokio::test]
    async fn test_run_produces_sources_and_trace() {
        let search = FixedSearch(SearchResponse {
            query: "q".to_string(),
            answer: None,
            results: vec![
                hit("https://a.example.com", "A"),
                hit("ftp://bad.example.com", "Bad"),
                hit("https://a.example.com", "A again"),
                hit("https://b.example.com", ""),
            ],
        });
        let agent = SearchAgent::new(search, RecordingLLM::default());

        let output = agent.run(&AgentRequest::new("q", "en")).await.unwrap();

        assert_eq!(output.response, "# Report\n\nFindings [1]");
        let urls: Vec<&str> = output.sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example.com", "https://b.example.com"]);
        let steps: Vec<&str> = output.trace.iter().map(|t| t.step.as_str()).collect();
        assert_eq!(steps, vec!["search", "synthesize"]);
        assert_eq!(output.provider.as_deref(), Some("mock"));
        assert_eq!(output.model.as_deref(), Some("mock-1"));
    }

    #[tokio::test]
    async fn test_language_selects_system_prompt() {
        let agent = SearchAgent::new(FixedSearch(SearchResponse::default()), RecordingLLM::default());
        agent.run(&AgentRequest::new("量子计算", "zh")).await.unwrap();

        let seen = agent.llm().seen.lock().unwrap();
        assert_eq!(seen[0].content, prompts::RESEARCH_SYSTEM_PROMPT_ZH);
        assert!(seen[1].content.contains("量子计算"));
    }

    #[tokio::test]
    async fn test_search_error_propagates() {
        let agent = SearchAgent::new(FailingSearch, RecordingLLM::default());
        let err = agent.run(&AgentRequest::new("q", "en")).await.unwrap_err();
        assert!(matches!(err, AgentError::Search(SearchError::Unauthorized)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_delegates() {
        assert!(AgentError::LLM(LLMError::Timeout).is_retryable());
        assert!(AgentError::Search(SearchError::RateLimited).is_retryable());
        assert!(!AgentError::LLM(LLMError::EmptyResponse).is_retryable());
    }
}
