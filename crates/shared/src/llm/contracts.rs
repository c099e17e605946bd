use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FALLBACK_TEXT_ANSWER: &str =
    "Sorry, something went wrong while contacting the AI. Please try again.";

/// Reply shape the model is instructed to produce and that callers receive
/// verbatim on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MindMapResponse {
    pub text_answer: String,
    pub graph_data: GraphData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    /// Hex color, e.g. `#00ffcc`.
    pub color: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

impl MindMapResponse {
    pub fn fallback() -> Self {
        Self {
            text_answer: FALLBACK_TEXT_ANSWER.to_string(),
            graph_data: GraphData::default(),
        }
    }
}

pub fn output_schema() -> Value {
    serde_json::to_value(schema_for!(MindMapResponse))
        .expect("mind map schema should be serializable")
}
