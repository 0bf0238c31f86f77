use super::capability::{AgentCapability, FragmentStream};
use super::roster::{AgentProfile, AgentRoster};
use super::tool::ToolRegistry;
use crate::error::{ToolError, UpstreamError};
use crate::llm::{ChatMessage, ChatModel, ModelEvent, ToolCall, ToolSpec};
use futures::stream::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

pub const DELEGATE_TOOL_NAME: &str = "delegate_task";

/// Counts model generations against a per-request limit
#[derive(Debug)]
pub struct StepBudget {
    limit: usize,
    used: usize,
}

impl StepBudget {
    pub fn new(limit: usize) -> Self {
        Self { limit, used: 0 }
    }

    /// Claim one step, failing once the limit is spent
    pub fn take(&mut self) -> Result<usize, UpstreamError> {
        if self.used >= self.limit {
            return Err(UpstreamError::StepLimitExceeded(self.limit));
        }
        self.used += 1;
        Ok(self.used)
    }

    pub fn used(&self) -> usize {
        self.used
    }
}

#[derive(Debug, Deserialize)]
struct DelegateArgs {
    agent: String,
    task: String,
}

/// Manager agent that routes each prompt to one of its members
///
/// The manager's generations are streamed to the caller. Delegations run the
/// member to completion (including its own tool calls) and feed the answer
/// back to the manager as a tool result.
#[derive(Clone)]
pub struct Supervisor {
    model: Arc<dyn ChatModel>,
    roster: Arc<AgentRoster>,
    tools: Arc<ToolRegistry>,
}

impl Supervisor {
    pub fn new(model: Arc<dyn ChatModel>, roster: AgentRoster, tools: ToolRegistry) -> Self {
        Self {
            model,
            roster: Arc::new(roster),
            tools: Arc::new(tools),
        }
    }

    fn delegate_spec(&self) -> ToolSpec {
        ToolSpec {
            name: DELEGATE_TOOL_NAME.to_string(),
            description: "Hand a task to one of the supervised agents and get its answer back"
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "agent": {
                        "type": "string",
                        "enum": self.roster.member_names(),
                        "description": "Name of the agent that should handle the task"
                    },
                    "task": {
                        "type": "string",
                        "description": "The task, phrased for that agent"
                    }
                },
                "required": ["agent", "task"]
            }),
        }
    }

    /// Drive the manager until it answers without delegating
    ///
    /// Returns early with `Ok` when the consumer has gone away.
    async fn run(
        &self,
        prompt: String,
        step_limit: usize,
        tx: &mpsc::Sender<Result<String, UpstreamError>>,
    ) -> Result<(), UpstreamError> {
        let manager = &self.roster.manager;
        let tools = [self.delegate_spec()];
        let mut budget = StepBudget::new(step_limit);
        let mut messages = vec![
            ChatMessage::system(self.roster.manager_prompt()),
            ChatMessage::user(prompt),
        ];

        loop {
            let step = budget.take()?;
            debug!(agent = %manager.name, step, "Manager generation");

            let mut events = self.model.stream(&manager.model, &messages, &tools).await?;
            let mut text = String::new();
            let mut calls = Vec::new();

            while let Some(event) = events.next().await {
                match event? {
                    ModelEvent::Text(delta) => {
                        text.push_str(&delta);
                        if tx.send(Ok(delta)).await.is_err() {
                            return Ok(());
                        }
                    }
                    ModelEvent::ToolCalls(requested) => calls.extend(requested),
                }
            }

            if calls.is_empty() {
                info!(steps = budget.used(), "Manager finished");
                return Ok(());
            }

            messages.push(ChatMessage::assistant_with_tools(text, calls.clone()));
            for call in calls {
                let result = self.delegate(&call, &mut budget).await?;
                messages.push(ChatMessage::tool_result(call.id, result));
            }
        }
    }

    /// Resolve one manager tool call into the text fed back to the manager
    async fn delegate(
        &self,
        call: &ToolCall,
        budget: &mut StepBudget,
    ) -> Result<String, UpstreamError> {
        let args = match parse_delegation(call) {
            Ok(args) => args,
            Err(err) => {
                warn!("Rejected delegation: {}", err);
                return Ok(tool_error_content(&err));
            }
        };

        let Some(member) = self.roster.member(&args.agent) else {
            let err = ToolError::UnknownAgent(args.agent);
            warn!("Rejected delegation: {}", err);
            return Ok(tool_error_content(&err));
        };

        info!(agent = %member.name, "Delegating task");
        self.run_member(member, args.task, budget).await
    }

    /// Run a member's tool loop to completion and return its final answer
    async fn run_member(
        &self,
        member: &AgentProfile,
        task: String,
        budget: &mut StepBudget,
    ) -> Result<String, UpstreamError> {
        let tools = self.tools.specs(&member.tools);
        let mut messages = vec![
            ChatMessage::system(member.instructions.clone()),
            ChatMessage::user(task),
        ];

        loop {
            let step = budget.take()?;
            debug!(agent = %member.name, step, "Member generation");

            let completion = self.model.complete(&member.model, &messages, &tools).await?;
            if completion.tool_calls.is_empty() {
                return Ok(completion.content);
            }

            messages.push(ChatMessage::assistant_with_tools(
                completion.content,
                completion.tool_calls.clone(),
            ));
            for call in completion.tool_calls {
                let content = if member.tools.contains(&call.name) {
                    match self.tools.call(&call.name, &call.arguments).await {
                        Ok(value) => value.to_string(),
                        Err(err) => {
                            warn!(agent = %member.name, tool = %call.name, "Tool failed: {}", err);
                            tool_error_content(&err)
                        }
                    }
                } else {
                    tool_error_content(&ToolError::UnknownTool(call.name.clone()))
                };
                messages.push(ChatMessage::tool_result(call.id, content));
            }
        }
    }
}

fn parse_delegation(call: &ToolCall) -> Result<DelegateArgs, ToolError> {
    if call.name != DELEGATE_TOOL_NAME {
        return Err(ToolError::UnknownTool(call.name.clone()));
    }
    serde_json::from_str(&call.arguments).map_err(|e| ToolError::InvalidArguments {
        tool: DELEGATE_TOOL_NAME.to_string(),
        message: e.to_string(),
    })
}

fn tool_error_content(err: &ToolError) -> String {
    json!({ "error": err.to_string() }).to_string()
}

impl AgentCapability for Supervisor {
    fn invoke(&self, prompt: String, step_limit: usize) -> FragmentStream {
        // Capacity 1: the producer runs at most one fragment ahead of the client
        let (tx, rx) = mpsc::channel(1);
        let supervisor = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = tx.closed() => {
                    debug!("Fragment consumer dropped, abandoning generation");
                }
                result = supervisor.run(prompt, step_limit, &tx) => {
                    if let Err(err) = result {
                        let _ = tx.send(Err(err)).await;
                    }
                }
            }
        });

        Box::pin(ReceiverStream::new(rx))
    }

    fn name(&self) -> &str {
        &self.roster.manager.name
    }
}
