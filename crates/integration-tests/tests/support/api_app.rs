use std::collections::VecDeque;
use std::sync::Arc;

use api_server::http::{AppState, build_router};
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use shared::llm::{
    CompletionError, CompletionFuture, CompletionGateway, CompletionRequest, CompletionResponse,
    CompletionTokenUsage, OpenAiChatGateway, OpenAiGatewayConfig,
};
use shared::service::{CompletionSettings, MindMapService};
use shared::sessions::InMemorySessionStore;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const TEST_MODEL: &str = "gpt-4o-mini";

/// Completion gateway that answers from a queue and records every request.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    replies: Arc<Mutex<VecDeque<Result<String, CompletionError>>>>,
    seen_requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn seen_requests(&self) -> Vec<CompletionRequest> {
        self.seen_requests.lock().await.clone()
    }
}

impl CompletionGateway for ScriptedGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async move {
            self.seen_requests.lock().await.push(request.clone());
            let content = self
                .replies
                .lock()
                .await
                .pop_front()
                .unwrap_or(Err(CompletionError::Network("no scripted reply".to_string())))?;

            Ok(CompletionResponse {
                model: request.model,
                provider_request_id: Some("chatcmpl-test".to_string()),
                content,
                usage: Some(CompletionTokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                }),
            })
        })
    }
}

pub fn build_test_router(gateway: Arc<dyn CompletionGateway>, api_configured: bool) -> axum::Router {
    let service = MindMapService::new(
        Arc::new(InMemorySessionStore::new()),
        gateway,
        CompletionSettings::for_model(TEST_MODEL),
        api_configured,
    );

    build_router(AppState { service })
}

pub fn build_openai_router(chat_completions_url: String) -> axum::Router {
    let config = OpenAiGatewayConfig {
        chat_completions_url,
        api_key: Some("test-openai-key".to_string()),
        model: TEST_MODEL.to_string(),
        timeout_ms: 5_000,
        deadline_ms: 10_000,
        max_retries: 1,
        retry_base_backoff_ms: 0,
    };
    let gateway = OpenAiChatGateway::new(config.clone()).expect("gateway should build");
    let service = MindMapService::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(gateway),
        CompletionSettings::from(&config),
        config.has_credential(),
    );

    build_router(AppState { service })
}

pub struct JsonResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let body = serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({}));

    JsonResponse {
        status,
        headers,
        body,
    }
}

pub fn request(method: Method, uri: &str, json_body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match json_body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

pub fn raw_json_request(uri: &str, raw_body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(raw_body.to_string()))
        .expect("request should build")
}

pub async fn ask(app: &axum::Router, chat_id: Option<&str>, prompt: &str) -> JsonResponse {
    send_json(
        app,
        request(
            Method::POST,
            "/ask",
            Some(json!({ "chat_id": chat_id, "prompt": prompt })),
        ),
    )
    .await
}

pub fn mind_map_reply(topic: &str) -> String {
    json!({
        "text_answer": format!("{topic} explained."),
        "graph_data": {
            "nodes": [
                {
                    "id": "root",
                    "label": topic,
                    "color": "#00ffcc",
                    "summary": format!("An overview of {topic}."),
                    "icon": "🌍"
                },
                {
                    "id": "child",
                    "label": format!("{topic} detail"),
                    "color": "#ff6b6b",
                    "summary": "A supporting idea."
                }
            ],
            "links": [
                { "source": "root", "target": "child" }
            ]
        }
    })
    .to_string()
}
