use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;

/// Minimal chat-completions endpoint that replays queued replies.
pub struct MockProviderServer {
    pub chat_completions_url: String,
    state: ProviderState,
    handle: tokio::task::JoinHandle<()>,
}

#[derive(Clone)]
struct ProviderState {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    seen_payloads: Arc<Mutex<Vec<Value>>>,
}

impl MockProviderServer {
    pub async fn start(replies: Vec<(StatusCode, Value)>) -> Self {
        let state = ProviderState {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            seen_payloads: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("mock provider listener should bind");
        let bind_addr = listener
            .local_addr()
            .expect("mock provider listener local address should exist");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("mock provider server should run");
        });

        Self {
            chat_completions_url: format!("http://{bind_addr}/v1/chat/completions"),
            state,
            handle,
        }
    }

    pub async fn seen_payloads(&self) -> Vec<Value> {
        self.state.seen_payloads.lock().await.clone()
    }
}

impl Drop for MockProviderServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [
            {
                "message": {
                    "role": "assistant",
                    "content": content
                }
            }
        ],
        "usage": {
            "prompt_tokens": 40,
            "completion_tokens": 60,
            "total_tokens": 100
        }
    })
}

pub fn provider_error_body(code: &str) -> Value {
    json!({
        "error": {
            "code": code
        }
    })
}

async fn chat_completions(
    State(state): State<ProviderState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.seen_payloads.lock().await.push(payload);

    let (status, body) = state.replies.lock().await.pop_front().unwrap_or((
        StatusCode::INTERNAL_SERVER_ERROR,
        provider_error_body("exhausted_mock_replies"),
    ));

    (status, Json(body))
}
