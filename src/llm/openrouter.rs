use super::model::{
    ChatMessage, ChatModel, Completion, CompletionStream, ModelEvent, ToolCall, ToolSpec,
};
use super::sse::SseDecoder;
use crate::config::OpenRouterConfig;
use crate::error::UpstreamError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

const SERVICE: &str = "openrouter";
const DONE_MARKER: &str = "[DONE]";

/// OpenAI-compatible chat completions client for the OpenRouter gateway
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build OpenRouter HTTP client")?;

        Ok(Self { client, config })
    }

    fn payload(model: &str, messages: &[ChatMessage], tools: &[ToolSpec], stream: bool) -> Value {
        let mut payload = json!({
            "model": model,
            "messages": messages.iter().map(message_to_wire).collect::<Vec<_>>(),
            "stream": stream,
        });
        if !tools.is_empty() {
            payload["tools"] = Value::Array(tools.iter().map(tool_to_wire).collect());
        }
        payload
    }

    async fn post(&self, payload: &Value) -> Result<reqwest::Response, UpstreamError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("X-Title", &self.config.app_name)
            .json(payload);
        if let Some(app_url) = &self.config.app_url {
            request = request.header("HTTP-Referer", app_url);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatModel for OpenRouterClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<Completion, UpstreamError> {
        debug!(model, messages = messages.len(), "OpenRouter completion");

        let payload = Self::payload(model, messages, tools, false);
        let body: Value = self
            .post(&payload)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;

        parse_completion(&body)
    }

    async fn stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<CompletionStream, UpstreamError> {
        debug!(model, messages = messages.len(), "OpenRouter streaming completion");

        let payload = Self::payload(model, messages, tools, true);
        let response = self.post(&payload).await?;
        let mut body = Box::pin(response.bytes_stream());

        let events = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            let mut calls = ToolCallAccumulator::default();
            let mut done = false;

            while !done {
                let chunk = match body.next().await {
                    Some(Ok(chunk)) => chunk,
                    Some(Err(err)) => {
                        yield Err(UpstreamError::transport(SERVICE, err));
                        return;
                    }
                    None => break,
                };

                for data in decoder.push(&chunk) {
                    match parse_stream_chunk(&data, &mut calls) {
                        Ok(ChunkOutcome::Text(text)) => yield Ok(ModelEvent::Text(text)),
                        Ok(ChunkOutcome::Nothing) => {}
                        Ok(ChunkOutcome::Done) => {
                            done = true;
                            break;
                        }
                        Err(err) => {
                            yield Err(err);
                            return;
                        }
                    }
                }
            }

            if !done {
                if let Some(data) = decoder.finish() {
                    match parse_stream_chunk(&data, &mut calls) {
                        Ok(ChunkOutcome::Text(text)) => yield Ok(ModelEvent::Text(text)),
                        Ok(_) => {}
                        Err(err) => {
                            yield Err(err);
                            return;
                        }
                    }
                }
            }

            let tool_calls = calls.finish();
            if !tool_calls.is_empty() {
                yield Ok(ModelEvent::ToolCalls(tool_calls));
            }
        };

        Ok(Box::pin(events))
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

// ============================================================================
// Wire format
// ============================================================================

fn message_to_wire(message: &ChatMessage) -> Value {
    let mut wire = json!({
        "role": message.role,
        "content": message.content,
    });
    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": { "name": call.name, "arguments": call.arguments },
                })
            })
            .collect();
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }
    wire
}

fn tool_to_wire(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

/// Pull a readable message out of an error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

fn provider_error(body: &Value) -> Option<UpstreamError> {
    let error = body.get("error")?;
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());
    Some(UpstreamError::Provider {
        service: SERVICE,
        message,
    })
}

fn parse_completion(body: &Value) -> Result<Completion, UpstreamError> {
    if let Some(err) = provider_error(body) {
        return Err(err);
    }

    let message = body
        .pointer("/choices/0/message")
        .ok_or_else(|| UpstreamError::invalid_response(SERVICE, "missing choices[0].message"))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| calls.iter().filter_map(parse_tool_call).collect())
        .unwrap_or_default();

    Ok(Completion {
        content,
        tool_calls,
    })
}

fn parse_tool_call(value: &Value) -> Option<ToolCall> {
    let name = value.pointer("/function/name")?.as_str()?.to_string();
    let arguments = match value.pointer("/function/arguments") {
        Some(Value::String(raw)) => raw.clone(),
        Some(other) => other.to_string(),
        None => "{}".to_string(),
    };
    Some(ToolCall {
        id: value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        name,
        arguments,
    })
}

enum ChunkOutcome {
    Text(String),
    Nothing,
    Done,
}

fn parse_stream_chunk(
    data: &str,
    calls: &mut ToolCallAccumulator,
) -> Result<ChunkOutcome, UpstreamError> {
    if data.trim() == DONE_MARKER {
        return Ok(ChunkOutcome::Done);
    }

    let chunk: Value = serde_json::from_str(data)
        .map_err(|e| UpstreamError::invalid_response(SERVICE, format!("bad stream chunk: {}", e)))?;

    if let Some(err) = provider_error(&chunk) {
        return Err(err);
    }

    let Some(delta) = chunk.pointer("/choices/0/delta") else {
        return Ok(ChunkOutcome::Nothing);
    };

    if let Some(fragments) = delta.get("tool_calls").and_then(Value::as_array) {
        for fragment in fragments {
            calls.apply(fragment);
        }
    }

    match delta.get("content").and_then(Value::as_str) {
        Some(text) if !text.is_empty() => Ok(ChunkOutcome::Text(text.to_string())),
        _ => Ok(ChunkOutcome::Nothing),
    }
}

/// Reassembles tool calls that arrive as indexed fragments across chunks
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    calls: BTreeMap<u64, ToolCall>,
}

impl ToolCallAccumulator {
    fn apply(&mut self, fragment: &Value) {
        let index = fragment.get("index").and_then(Value::as_u64).unwrap_or(0);
        let call = self.calls.entry(index).or_insert_with(|| ToolCall {
            id: String::new(),
            name: String::new(),
            arguments: String::new(),
        });

        if let Some(id) = fragment.get("id").and_then(Value::as_str) {
            if !id.is_empty() {
                call.id = id.to_string();
            }
        }
        if let Some(name) = fragment.pointer("/function/name").and_then(Value::as_str) {
            if !name.is_empty() {
                call.name = name.to_string();
            }
        }
        if let Some(arguments) = fragment.pointer("/function/arguments").and_then(Value::as_str) {
            call.arguments.push_str(arguments);
        }
    }

    fn finish(self) -> Vec<ToolCall> {
        self.calls
            .into_iter()
            .filter(|(_, call)| !call.name.is_empty())
            .map(|(index, mut call)| {
                if call.id.is_empty() {
                    call.id = format!("call_{}", index);
                }
                if call.arguments.is_empty() {
                    call.arguments = "{}".to_string();
                }
                call
            })
            .collect()
    }
}
