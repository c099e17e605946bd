use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::llm::{
    CONTEXT_WINDOW_TURNS, CompletionGateway, CompletionRequest, MindMapResponse,
    OpenAiGatewayConfig, build_messages, contract_violations,
};
use crate::models::{ClearSessionResponse, StatsResponse, StatusResponse};
use crate::sessions::{SessionLocks, SessionStore, SessionStoreError, Turn, resolve_session_id};

pub const MODEL_TEMPERATURE: f32 = 0.7;
pub const MODEL_MAX_TOKENS: u32 = 1500;
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

const CLEARED_MESSAGE: &str = "History cleared successfully";
const NOT_FOUND_MESSAGE: &str = "Chat not found";

#[derive(Debug, Error)]
pub enum MindMapError {
    #[error("prompt must not be empty")]
    InvalidRequest,
    #[error("model reply is not valid json: {0}")]
    UpstreamFormat(#[source] serde_json::Error),
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Body returned to a successful ask.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AskReply {
    /// The model's reply, parsed but otherwise untouched.
    Model(Value),
    /// Fixed apology with an empty graph, used when the provider call fails.
    Fallback(MindMapResponse),
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionSettings {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: MODEL_TEMPERATURE,
            max_tokens: MODEL_MAX_TOKENS,
        }
    }
}

impl From<&OpenAiGatewayConfig> for CompletionSettings {
    fn from(config: &OpenAiGatewayConfig) -> Self {
        Self::for_model(config.model.clone())
    }
}

/// Session-bounded prompt gateway: keeps a short history per session and
/// relays prompts to the completion provider.
#[derive(Clone)]
pub struct MindMapService {
    store: Arc<dyn SessionStore>,
    gateway: Arc<dyn CompletionGateway>,
    locks: SessionLocks,
    settings: CompletionSettings,
    api_configured: bool,
}

impl MindMapService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        gateway: Arc<dyn CompletionGateway>,
        settings: CompletionSettings,
        api_configured: bool,
    ) -> Self {
        Self {
            store,
            gateway,
            locks: SessionLocks::new(),
            settings,
            api_configured,
        }
    }

    pub async fn handle_ask(
        &self,
        session_id: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<AskReply, MindMapError> {
        let prompt = match prompt {
            Some(prompt) if !prompt.trim().is_empty() => prompt,
            _ => return Err(MindMapError::InvalidRequest),
        };
        let session_id = resolve_session_id(session_id);

        // Held until the exchange is stored so same-session asks cannot interleave.
        let _session_guard = self.locks.acquire(&session_id).await;

        let history = self
            .store
            .open_window(&session_id, CONTEXT_WINDOW_TURNS)
            .await?;
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages: build_messages(&history, prompt),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let started_at = Instant::now();
        let response = match self.gateway.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    session_id = %session_id,
                    error_type = err.error_type(),
                    error = %err,
                    latency_ms = elapsed_ms(started_at),
                    "completion failed; returning fallback reply"
                );
                return Ok(AskReply::Fallback(MindMapResponse::fallback()));
            }
        };

        let parsed = match serde_json::from_str::<Value>(&response.content) {
            Ok(parsed) => parsed,
            Err(err) => {
                error!(
                    session_id = %session_id,
                    model = %response.model,
                    error = %err,
                    raw_reply = %response.content,
                    "model reply is not valid json"
                );
                return Err(MindMapError::UpstreamFormat(err));
            }
        };

        let violations = contract_violations(&parsed);
        if !violations.is_empty() {
            warn!(
                session_id = %session_id,
                violations = ?violations,
                "model reply departs from the mind map contract"
            );
        }

        let turn_count = self
            .store
            .append_exchange(&session_id, Turn::user(prompt), Turn::assistant(response.content))
            .await?;

        info!(
            session_id = %session_id,
            model = %response.model,
            provider_request_id = response.provider_request_id.as_deref().unwrap_or("none"),
            total_tokens = response.usage.as_ref().map(|usage| usage.total_tokens),
            turn_count,
            latency_ms = elapsed_ms(started_at),
            "ask completed"
        );

        Ok(AskReply::Model(parsed))
    }

    pub async fn clear_session(
        &self,
        session_id: &str,
    ) -> Result<ClearSessionResponse, MindMapError> {
        let _session_guard = self.locks.acquire(session_id).await;

        if self.store.remove(session_id).await? {
            info!(session_id = %session_id, "session cleared");
            Ok(ClearSessionResponse::Cleared {
                message: CLEARED_MESSAGE.to_string(),
                chat_id: session_id.to_string(),
            })
        } else {
            Ok(ClearSessionResponse::NotFound {
                error: NOT_FOUND_MESSAGE.to_string(),
                chat_id: session_id.to_string(),
            })
        }
    }

    pub async fn status(&self) -> Result<StatusResponse, MindMapError> {
        let counts = self.store.turn_counts().await?;

        Ok(StatusResponse {
            status: "online".to_string(),
            sessions_active: counts.len(),
            total_messages: counts.values().sum(),
            version: SERVICE_VERSION.to_string(),
            api_configured: self.api_configured,
        })
    }

    pub async fn stats(&self) -> Result<StatsResponse, MindMapError> {
        let counts = self.store.turn_counts().await?;

        Ok(StatsResponse {
            total_sessions: counts.len(),
            session_ids: counts.keys().cloned().collect(),
            messages_per_session: counts,
        })
    }
}

fn elapsed_ms(started_at: Instant) -> u64 {
    started_at.elapsed().as_millis() as u64
}
