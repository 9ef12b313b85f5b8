use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{SearchClient, SearchError, SearchResponse};
use crate::config::{SearchConfig, SearchTopic, Secret};
use crate::llm::snippet;

/// Tavily search API client.
///
/// Identical searches within one process are answered from an in-memory
/// cache keyed by query, topic and result count.
pub struct TavilyClient {
    http: Client,
    api_key: Secret,
    base_url: String,
    max_results: u32,
    topic: SearchTopic,
    include_answer: bool,
    timeout: Duration,
    cache: Mutex<HashMap<String, SearchResponse>>,
}

impl TavilyClient {
    /// Creates a client from the search configuration.
    pub fn new(config: &SearchConfig, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_results: config.max_results,
            topic: config.topic,
            include_answer: config.include_answer,
            timeout,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache_key(&self, query: &str) -> String {
        format!("{}:{}:{}", query, self.topic.as_str(), self.max_results)
    }

    fn cached(&self, key: &str) -> Option<SearchResponse> {
        self.cache.lock().ok()?.get(key).cloned()
    }

    fn store(&self, key: String, response: &SearchResponse) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, response.clone());
        }
    }

    async fn send_request(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let request = TavilyRequest {
            api_key: self.api_key.expose(),
            query,
            max_results: self.max_results,
            topic: self.topic.as_str(),
            search_depth: "basic",
            include_answer: self.include_answer,
            include_raw_content: false,
        };

        let url = format!("{}/search", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SearchError::Unauthorized);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Tavily API rate limited");
            return Err(SearchError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, "Tavily API error");
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: snippet(&text),
            });
        }

        // Read failures (a stalled body included) go through `From<reqwest::Error>`
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SearchError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, SearchError> {
        let key = self.cache_key(query);
        if let Some(hit) = self.cached(&key) {
            debug!(query, "returning cached search results");
            return Ok(hit);
        }

        info!(query, topic = self.topic.as_str(), "searching");
        let response = self.send_request(query).await?;
        debug!(results = response.results.len(), "search complete");

        self.store(key, &response);
        Ok(response)
    }
}

#[derive(Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    topic: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    include_raw_content: bool,
}
