pub mod contracts;
pub mod gateway;
pub mod openai;
pub mod prompts;
pub mod validation;

pub use contracts::{GraphData, GraphLink, GraphNode, MindMapResponse, output_schema};
pub use gateway::{
    ChatMessage, ChatRole, CompletionError, CompletionFuture, CompletionGateway,
    CompletionRequest, CompletionResponse, CompletionTokenUsage,
};
pub use openai::{OpenAiChatGateway, OpenAiGatewayConfig};
pub use prompts::{CONTEXT_WINDOW_TURNS, MIND_MAP_SYSTEM_PROMPT, build_messages};
pub use validation::contract_violations;
