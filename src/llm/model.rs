use crate::error::UpstreamError;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Provider-assigned call ID, echoed back with the tool result
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model (may be malformed)
    pub arguments: String,
}

/// A tool advertised to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object
    pub parameters: Value,
}

/// One message of a conversation sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    /// Set on `Role::Tool` messages
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Assistant turn that requested tools; empty text is sent as null content
    pub fn assistant_with_tools(content: String, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: (!content.is_empty()).then_some(content),
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// Result of a non-streaming completion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

/// Incremental output of a streaming completion
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// Text delta, in generation order
    Text(String),
    /// Fully assembled tool calls, emitted once after the last text delta
    ToolCalls(Vec<ToolCall>),
}

pub type CompletionStream = BoxStream<'static, Result<ModelEvent, UpstreamError>>;

/// Chat-completion backend
///
/// Implementations:
/// - OpenRouter (OpenAI-compatible chat completions)
/// - Scripted models in tests
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one generation and wait for the whole answer
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<Completion, UpstreamError>;

    /// Run one generation, yielding text as it is produced
    async fn stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<CompletionStream, UpstreamError>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
