//! End-to-end tests for the Chatfolio pipeline.
//!
//! Each test drives the real router, completion client and HTTP provider
//! against a `wiremock` stand-in for the OpenAI-compatible API.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chatfolio_config::AppConfig;
use chatfolio_gateway::{GatewayState, build_router};
use chatfolio_knowledge::KnowledgeRecord;
use chatfolio_providers::{CompletionClient, CompletionSettings, OpenAiCompatProvider, RetryPolicy};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "sk-e2e-do-not-leak";

fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 900, "completion_tokens": 20, "total_tokens": 920}
    })
}

fn app(server: &MockServer, api_key: Option<&str>, debug: bool) -> axum::Router {
    let provider = OpenAiCompatProvider::new(
        "openai",
        format!("{}/v1", server.uri()),
        api_key.map(str::to_string),
    )
    .unwrap();
    let completion = CompletionClient::new(
        Arc::new(provider),
        CompletionSettings::default(),
        RetryPolicy::new(3, Duration::from_millis(10)),
    );
    let knowledge = Arc::new(KnowledgeRecord::builtin().unwrap());
    let state = Arc::new(GatewayState::new(knowledge, completion, debug));
    build_router(state, &AppConfig::default().gateway)
}

async fn chat(app: axum::Router, body: &'static str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn chat_round_trip_through_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token(API_KEY))
        .and(body_partial_json(json!({
            "model": "gpt-4",
            "max_tokens": 500,
            "stream": false,
            "messages": [
                {"role": "system"},
                {"role": "user", "content": "Tell me about Manuel David"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Manuel David is a Full Stack Developer & AI Specialist.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = chat(
        app(&server, Some(API_KEY), false),
        r#"{"message": "  Tell me about Manuel David  "}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["response"],
        "Manuel David is a Full Stack Developer & AI Specialist."
    );
}

#[tokio::test]
async fn system_prompt_carries_the_knowledge_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&server)
        .await;

    let (status, _) = chat(app(&server, Some(API_KEY), false), r#"{"message": "hi"}"#).await;
    assert_eq!(status, StatusCode::OK);

    let requests = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = sent["messages"][0]["content"].as_str().unwrap();
    let record = KnowledgeRecord::builtin().unwrap();

    assert!(prompt.contains(&record.personal_info.email));
    for project in &record.projects {
        assert!(prompt.contains(&project.name), "missing {}", project.name);
    }
    assert!(prompt.contains("INSTRUCTIONS:"));
}

#[tokio::test]
async fn transient_upstream_failures_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("recovered")))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = chat(app(&server, Some(API_KEY), false), r#"{"message": "hi"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "recovered");
}

#[tokio::test]
async fn rejected_key_maps_to_configuration_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": format!("Incorrect API key provided: {API_KEY}")}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let (status, body) = chat(app(&server, Some(API_KEY), true), r#"{"message": "hi"}"#).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["error"],
        "Service configuration error. Please contact support."
    );
    assert_eq!(body["details"], "API key issue");
    assert!(!body.to_string().contains(API_KEY));
}

#[tokio::test]
async fn persistent_rate_limit_maps_to_busy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .expect(3)
        .mount(&server)
        .await;

    let (status, body) = chat(app(&server, Some(API_KEY), false), r#"{"message": "hi"}"#).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({"error": "Service is busy. Please try again in a few minutes."})
    );
}

#[tokio::test]
async fn missing_key_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = chat(app(&server, None, false), r#"{"message": "hi"}"#).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body["error"],
        "Service configuration error. Please contact support."
    );
}

#[tokio::test]
async fn upstream_without_choices_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"model": "gpt-4", "choices": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = chat(app(&server, Some(API_KEY), false), r#"{"message": "hi"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], "Empty response from AI service");
}

#[tokio::test]
async fn invalid_input_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let (status, body) = chat(app(&server, Some(API_KEY), false), r#"{"message": ""}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Please provide a message"}));
}
