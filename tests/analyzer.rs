//! AiAnalyzer request and reply handling for each provider.

use serde_json::json;
use sitecrawl::error::AppError;
use sitecrawl::models::Provider;
use sitecrawl::services::{AiAnalyzer, ContentAnalyzer};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPLY: &str = "```json\n{\"seo\": [\"add a meta description\"], \"performance\": [\"lazy-load images\"]}\n```";

fn analyzer(server: &MockServer, provider: Provider) -> AiAnalyzer {
    AiAnalyzer::new(reqwest::Client::new(), provider, "test-key").with_base_url(server.uri())
}

#[tokio::test]
async fn openai_chat_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({ "model": "gpt-3.5-turbo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": REPLY } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = analyzer(&server, Provider::OpenAi)
        .analyze("http://a.test", "Home", "Welcome")
        .await
        .unwrap();
    assert_eq!(suggestions.seo, vec!["add a meta description".to_string()]);
    assert_eq!(suggestions.performance, vec!["lazy-load images".to_string()]);
}

#[tokio::test]
async fn gemini_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": REPLY }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = analyzer(&server, Provider::Gemini)
        .analyze("http://a.test", "Home", "")
        .await
        .unwrap();
    assert_eq!(suggestions.seo.len(), 1);
}

#[tokio::test]
async fn anthropic_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": REPLY }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let suggestions = analyzer(&server, Provider::Anthropic)
        .with_model("claude-3-5-sonnet-latest")
        .analyze("http://a.test", "Home", "Welcome")
        .await
        .unwrap();
    assert_eq!(suggestions.performance.len(), 1);
}

#[tokio::test]
async fn api_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = analyzer(&server, Provider::OpenAi)
        .analyze("http://a.test", "Home", "Welcome")
        .await
        .unwrap_err();
    match err {
        AppError::Analysis(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unparseable_reply_is_analysis_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "Sorry, I can't do that." } }]
        })))
        .mount(&server)
        .await;

    let result = analyzer(&server, Provider::OpenAi)
        .analyze("http://a.test", "Home", "Welcome")
        .await;
    assert!(matches!(result, Err(AppError::Analysis(_))));
}
