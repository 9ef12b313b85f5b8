use std::time::Duration;

use lonai_core::config::{SearchConfig, SearchTopic, Secret};
use lonai_core::search::{SearchClient, SearchError, TavilyClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn search_config(server: &MockServer) -> SearchConfig {
    SearchConfig {
        api_key: Secret::new("tvly-test"),
        base_url: server.uri(),
        max_results: 3,
        topic: SearchTopic::News,
        include_answer: false,
    }
}

fn client_for(server: &MockServer) -> TavilyClient {
    TavilyClient::new(&search_config(server), Duration::from_secs(5))
}

fn results_body() -> serde_json::Value {
    json!({
        "query": "rust async",
        "answer": null,
        "results": [
            {"title": "Async Book", "url": "https://rust-lang.github.io/async-book/", "content": "Async in Rust", "score": 0.92},
            {"title": "Tokio", "url": "https://tokio.rs", "content": "Runtime", "score": 0.81, "raw_content": null}
        ],
        "response_time": 1.2
    })
}

#[tokio::test]
async fn test_search_sends_expected_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({
            "api_key": "tvly-test",
            "query": "rust async",
            "max_results": 3,
            "topic": "news",
            "include_answer": false,
            "include_raw_content": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).search("rust async").await.unwrap();

    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].title, "Async Book");
    assert_eq!(response.results[1].url, "https://tokio.rs");
    assert!(response.answer.is_none());
}

#[tokio::test]
async fn test_repeated_search_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.search("rust async").await.unwrap();
    let second = client.search("rust async").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_include_answer_requests_summary() {
    let server = MockServer::start().await;
    let mut body = results_body();
    body["answer"] = json!("Rust async runs on executors such as Tokio.");

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({"include_answer": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let config = SearchConfig {
        include_answer: true,
        ..search_config(&server)
    };
    let response = TavilyClient::new(&config, Duration::from_secs(5))
        .search("rust async")
        .await
        .unwrap();

    assert_eq!(
        response.answer.as_deref(),
        Some("Rust async runs on executors such as Tokio.")
    );
}

#[tokio::test]
async fn test_slow_response_is_retryable_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(results_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = TavilyClient::new(&search_config(&server), Duration::from_millis(200));
    let err = client.search("rust async").await.unwrap_err();

    assert!(matches!(err, SearchError::Timeout), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_error_statuses() {
    let cases = [
        (401, "unauthorized"),
        (429, "rate_limited"),
        (500, "server"),
    ];

    for (status, label) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(status).set_body_string("detail"))
            .mount(&server)
            .await;

        let err = client_for(&server).search("q").await.unwrap_err();
        match label {
            "unauthorized" => {
                assert!(matches!(err, SearchError::Unauthorized));
                assert!(!err.is_retryable());
            }
            "rate_limited" => {
                assert!(matches!(err, SearchError::RateLimited));
                assert!(err.is_retryable());
            }
            _ => {
                assert!(matches!(err, SearchError::Api { status: 500, .. }));
                assert!(err.is_retryable());
            }
        }
    }
}

#[tokio::test]
async fn test_failed_search_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_body()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.search("q").await.is_err());
    assert_eq!(client.search("q").await.unwrap().results.len(), 2);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).search("q").await.unwrap_err();
    assert!(matches!(err, SearchError::Parse(_)));
}
