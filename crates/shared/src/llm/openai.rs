use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::{sleep, timeout};
use tracing::debug;

use super::gateway::{
    CompletionError, CompletionFuture, CompletionGateway, CompletionRequest, CompletionResponse,
    CompletionTokenUsage,
};
use crate::config::{ConfigError, is_placeholder_credential};
use crate::config_env::{
    EnvLookup, optional_trimmed_env, parse_http_url_env, parse_u32_env, parse_u64_env,
};

const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_DEADLINE_MS: u64 = 45_000;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE_BACKOFF_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct OpenAiGatewayConfig {
    pub chat_completions_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_ms: u64,
    /// Upper bound for one `complete` call, retries and backoff included.
    pub deadline_ms: u64,
    pub max_retries: u32,
    pub retry_base_backoff_ms: u64,
}

impl OpenAiGatewayConfig {
    pub(crate) fn from_lookup(lookup: &EnvLookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            chat_completions_url: parse_http_url_env(
                lookup,
                "OPENAI_CHAT_COMPLETIONS_URL",
                DEFAULT_CHAT_COMPLETIONS_URL,
            )?,
            api_key: optional_trimmed_env(lookup, "OPENAI_API_KEY")
                .filter(|key| !is_placeholder_credential(key)),
            model: optional_trimmed_env(lookup, "OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_ms: parse_u64_env(lookup, "OPENAI_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            deadline_ms: parse_u64_env(lookup, "OPENAI_DEADLINE_MS", DEFAULT_DEADLINE_MS)?,
            max_retries: parse_u32_env(lookup, "OPENAI_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_base_backoff_ms: parse_u64_env(
                lookup,
                "OPENAI_RETRY_BASE_BACKOFF_MS",
                DEFAULT_RETRY_BASE_BACKOFF_MS,
            )?,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Clone)]
pub struct OpenAiChatGateway {
    client: reqwest::Client,
    config: OpenAiGatewayConfig,
}

impl OpenAiChatGateway {
    pub fn new(config: OpenAiGatewayConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| ConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    async fn complete_with_retries(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let mut attempt = 0_u32;

        loop {
            match self.send_once(api_key, request).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if err.retryable && attempt < self.config.max_retries {
                        let backoff_multiplier = 2_u64.saturating_pow(attempt);
                        let backoff_ms = self
                            .config
                            .retry_base_backoff_ms
                            .saturating_mul(backoff_multiplier);
                        debug!(
                            attempt,
                            backoff_ms,
                            error_type = err.error.error_type(),
                            "retrying completion request"
                        );
                        sleep(Duration::from_millis(backoff_ms)).await;
                        attempt = attempt.saturating_add(1);
                        continue;
                    }

                    return Err(err.error);
                }
            }
        }
    }

    async fn send_once(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, SendAttemptError> {
        let request_body = json!({
            "model": request.model,
            "messages": request.messages,
            "response_format": {
                "type": "json_object"
            },
            "temperature": request.temperature,
            "max_tokens": request.max_tokens
        });

        let response = self
            .client
            .post(&self.config.chat_completions_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    SendAttemptError::retryable(CompletionError::Timeout)
                } else {
                    SendAttemptError::retryable(CompletionError::Network(
                        "request_unavailable".to_string(),
                    ))
                }
            })?;

        let status = response.status();
        let header_request_id = header_request_id(response.headers());
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                SendAttemptError::retryable(CompletionError::Timeout)
            } else {
                SendAttemptError::non_retryable(CompletionError::InvalidProviderPayload(
                    "response_body_read_failed".to_string(),
                ))
            }
        })?;

        if !status.is_success() {
            let provider_code = parse_provider_error_code(&body);
            let error = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    CompletionError::Unauthorized(status.as_u16())
                }
                StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited(provider_code),
                _ => CompletionError::ProviderStatus {
                    status: status.as_u16(),
                    code: provider_code,
                },
            };
            return Err(SendAttemptError {
                error,
                retryable: is_retryable_status(status),
            });
        }

        let parsed: ChatCompletionSuccessResponse = serde_json::from_str(&body).map_err(|_| {
            SendAttemptError::non_retryable(CompletionError::InvalidProviderPayload(
                "response_json_parse_failed".to_string(),
            ))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                SendAttemptError::non_retryable(CompletionError::InvalidProviderPayload(
                    "missing_choice".to_string(),
                ))
            })?
            .message
            .content;

        let content = match content {
            Value::String(raw) => raw,
            value @ Value::Object(_) => value.to_string(),
            Value::Null => {
                return Err(SendAttemptError::non_retryable(
                    CompletionError::InvalidProviderPayload("missing_content".to_string()),
                ));
            }
            _ => {
                return Err(SendAttemptError::non_retryable(
                    CompletionError::InvalidProviderPayload(
                        "unsupported_content_shape".to_string(),
                    ),
                ));
            }
        };

        Ok(CompletionResponse {
            model: parsed.model.unwrap_or_else(|| request.model.clone()),
            provider_request_id: header_request_id.or(parsed.id),
            content,
            usage: parsed.usage.map(|usage| CompletionTokenUsage {
                prompt_tokens: clamp_u64_to_u32(usage.prompt_tokens.unwrap_or(0)),
                completion_tokens: clamp_u64_to_u32(usage.completion_tokens.unwrap_or(0)),
                total_tokens: clamp_u64_to_u32(usage.total_tokens.unwrap_or(0)),
            }),
        })
    }
}

impl CompletionGateway for OpenAiChatGateway {
    fn complete<'a>(&'a self, request: CompletionRequest) -> CompletionFuture<'a> {
        Box::pin(async move {
            let Some(api_key) = self.config.api_key.as_deref() else {
                return Err(CompletionError::MissingCredential);
            };

            let deadline = Duration::from_millis(self.config.deadline_ms);
            match timeout(deadline, self.complete_with_retries(api_key, &request)).await {
                Ok(result) => result,
                Err(_) => {
                    debug!(deadline_ms = self.config.deadline_ms, "completion deadline elapsed");
                    Err(CompletionError::Timeout)
                }
            }
        })
    }
}

#[derive(Debug)]
struct SendAttemptError {
    error: CompletionError,
    retryable: bool,
}

impl SendAttemptError {
    fn retryable(error: CompletionError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }

    fn non_retryable(error: CompletionError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionSuccessResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::CONFLICT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn header_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        code: Option<Value>,
        #[serde(rename = "type")]
        kind: Option<String>,
    }

    let Some(details) = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
    else {
        return "unknown".to_string();
    };

    match details.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => details.kind.unwrap_or_else(|| "unknown".to_string()),
    }
}

fn clamp_u64_to_u32(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}
