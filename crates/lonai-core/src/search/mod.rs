//! Web search used by the research agent.

mod tavily;

pub use tavily::TavilyClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by a search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API rejected the API key. Check TAVILY_API_KEY.")]
    Unauthorized,

    #[error("Search API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Search API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Search request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse search response: {0}")]
    Parse(String),
}

impl SearchError {
    /// Whether a second attempt could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::RateLimited | SearchError::Timeout | SearchError::Network(_) => true,
            SearchError::Api { status, .. } => *status >= 500,
            SearchError::Unauthorized | SearchError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Network(err.to_string())
        }
    }
}

/// Results of one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    /// Short answer generated by the search API, when requested
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// A single search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

/// Abstraction over the web search backend.
/// Implemented by `TavilyClient` for production; fakes are used in tests.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError>;
}
