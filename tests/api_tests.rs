use therapy_chat_backend::message::ChatResponse;
use therapy_chat_backend::routes::create_router;
use therapy_chat_backend::services::adapter::ChatAdapter;
use therapy_chat_backend::services::memory::{InMemoryStore, Turn};
use therapy_chat_backend::services::provider::{ChatProvider, ProviderError};
use therapy_chat_backend::state::AppState;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::Mutex;
use tower::util::ServiceExt;

/// Echoes the newest user turn and records every turn list it receives.
struct EchoProvider {
    calls: Mutex<Vec<Vec<Turn>>>,
}

impl EchoProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
        })
    }

    async fn calls(&self) -> Vec<Vec<Turn>> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ChatProvider for EchoProvider {
    async fn complete(&self, _system: &str, turns: &[Turn]) -> Result<String, ProviderError> {
        self.calls.lock().await.push(turns.to_vec());
        Ok(turns.last().map(|t| t.content.clone()).unwrap_or_default())
    }
}

struct FailingProvider;

#[async_trait]
impl ChatProvider for FailingProvider {
    async fn complete(&self, _system: &str, _turns: &[Turn]) -> Result<String, ProviderError> {
        Err(ProviderError::Status {
            status: 503,
            message: "model overloaded".to_string(),
        })
    }
}

fn test_app(provider: Arc<dyn ChatProvider>) -> Router {
    let memory = Arc::new(InMemoryStore::new(Duration::from_secs(60)));
    let adapter = ChatAdapter::new("You are a test assistant.", provider, memory);
    create_router().with_state(Arc::new(AppState::new(adapter)))
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_response(response: axum::response::Response) -> ChatResponse {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_chat_endpoint_echoes_message() {
    let provider = EchoProvider::new();
    let app = test_app(provider);

    let response = app
        .oneshot(chat_request(r#"{"message": "hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp = read_response(response).await;
    assert_eq!(chat_resp.response, "hello");
    assert!(!chat_resp.thread_id.is_empty());
}

#[tokio::test]
async fn test_missing_message_field_is_rejected() {
    let provider = EchoProvider::new();
    let app = test_app(provider.clone());

    let response = app
        .oneshot(chat_request(r#"{"thread_id": "abc"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(provider.calls().await.is_empty(), "no provider call expected");
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let provider = EchoProvider::new();
    let app = test_app(provider.clone());

    let response = app
        .oneshot(chat_request(r#"{"message": "   "}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(provider.calls().await.is_empty(), "no provider call expected");
}

#[tokio::test]
async fn test_same_thread_accumulates_history() {
    let provider = EchoProvider::new();
    let app = test_app(provider.clone());

    let response = app
        .clone()
        .oneshot(chat_request(
            r#"{"message": "first message", "thread_id": "t-1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(chat_request(
            r#"{"message": "second message", "thread_id": "t-1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = provider.calls().await;
    assert_eq!(calls.len(), 2);
    // Second call carries the first exchange plus the new user turn.
    assert_eq!(calls[1].len(), 3);
    assert!(calls[1].iter().any(|t| t.content == "first message"));
}

#[tokio::test]
async fn test_distinct_threads_share_no_history() {
    let provider = EchoProvider::new();
    let app = test_app(provider.clone());

    let response = app
        .clone()
        .oneshot(chat_request(r#"{"message": "one", "thread_id": "t-a"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(chat_request(r#"{"message": "two", "thread_id": "t-b"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let calls = provider.calls().await;
    assert_eq!(calls[1].len(), 1);
    assert!(calls[1].iter().all(|t| t.content != "one"));
}

#[tokio::test]
async fn test_provider_failure_maps_to_5xx() {
    let app = test_app(Arc::new(FailingProvider));

    let response = app
        .oneshot(chat_request(r#"{"message": "hello"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert!(body.get("response").is_none());
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(EchoProvider::new());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
