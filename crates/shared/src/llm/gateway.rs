use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CompletionResponse, CompletionError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// One chat-completion call. The provider is always asked for a single JSON
/// object reply.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionTokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub model: String,
    pub provider_request_id: Option<String>,
    /// Raw message content as returned by the provider, not yet parsed.
    pub content: String,
    pub usage: Option<CompletionTokenUsage>,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion provider credential is not configured")]
    MissingCredential,
    #[error("completion provider request timed out")]
    Timeout,
    #[error("completion provider is unreachable: {0}")]
    Network(String),
    #[error("completion provider rejected the credential: status={0}")]
    Unauthorized(u16),
    #[error("completion provider rate limited the request: code={0}")]
    RateLimited(String),
    #[error("completion provider request failed: status={status} code={code}")]
    ProviderStatus { status: u16, code: String },
    #[error("completion provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

impl CompletionError {
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::Timeout => "timeout",
            Self::Network(_) => "network",
            Self::Unauthorized(_) => "unauthorized",
            Self::RateLimited(_) => "rate_limited",
            Self::ProviderStatus { .. } => "provider_status",
            Self::InvalidProviderPayload(_) => "invalid_provider_payload",
        }
    }
}

pub trait CompletionGateway: Send + Sync {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a>;
}
