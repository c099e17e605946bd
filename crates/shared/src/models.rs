use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Error body returned by the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub sessions_active: usize,
    pub total_messages: usize,
    pub version: String,
    pub api_configured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_sessions: usize,
    pub session_ids: Vec<String>,
    pub messages_per_session: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClearSessionResponse {
    Cleared { message: String, chat_id: String },
    NotFound { error: String, chat_id: String },
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AskRequest, ClearSessionResponse};

    #[test]
    fn ask_request_tolerates_missing_and_null_fields() {
        let request: AskRequest =
            serde_json::from_value(json!({"chat_id": null})).expect("request should decode");

        assert!(request.chat_id.is_none());
        assert!(request.prompt.is_none());
    }

    #[test]
    fn clear_responses_serialize_without_tags() {
        let cleared = serde_json::to_value(ClearSessionResponse::Cleared {
            message: "History cleared".to_string(),
            chat_id: "s1".to_string(),
        })
        .expect("response should serialize");
        assert_eq!(cleared, json!({"message": "History cleared", "chat_id": "s1"}));

        let missing = serde_json::to_value(ClearSessionResponse::NotFound {
            error: "Chat not found".to_string(),
            chat_id: "s2".to_string(),
        })
        .expect("response should serialize");
        assert_eq!(missing, json!({"error": "Chat not found", "chat_id": "s2"}));
    }
}
