//! Language-model access
//!
//! The `ChatModel` trait is the only thing the agents see; `OpenRouterClient`
//! is the production implementation speaking the OpenAI chat-completions
//! dialect, streamed over server-sent events.

pub mod model;
pub mod openrouter;
pub mod sse;

pub use model::{
    ChatMessage, ChatModel, Completion, CompletionStream, ModelEvent, Role, ToolCall, ToolSpec,
};
pub use openrouter::OpenRouterClient;
pub use sse::SseDecoder;
