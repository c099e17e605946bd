use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::config_env::{EnvLookup, optional_trimmed_env};
use crate::llm::OpenAiGatewayConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Credential values shipped in deployment templates. They are treated the
/// same as a missing key.
const PLACEHOLDER_CREDENTIALS: &[&str] = &[
    "sizning-api-kalitingiz-bu-yerga",
    "your-api-key-here",
    "sk-...",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {key}: {value}")]
    ParseInt { key: String, value: String },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build completion http client: {0}")]
    HttpClient(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported LOG_FORMAT '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub log_format: LogFormat,
    pub openai: OpenAiGatewayConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: &EnvLookup<'_>) -> Result<Self, ConfigError> {
        let log_format = match optional_trimmed_env(lookup, "LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(ConfigError::InvalidConfiguration)?,
            None => LogFormat::Text,
        };

        Ok(Self {
            bind_addr: optional_trimmed_env(lookup, "API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            log_format,
            openai: OpenAiGatewayConfig::from_lookup(lookup)?,
        })
    }
}

/// Loads `.env` from the working directory when present.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

pub fn is_placeholder_credential(value: &str) -> bool {
    let trimmed = value.trim();
    PLACEHOLDER_CREDENTIALS
        .iter()
        .any(|placeholder| trimmed.eq_ignore_ascii_case(placeholder))
}
