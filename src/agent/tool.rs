use crate::error::ToolError;
use crate::llm::ToolSpec;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A callable tool an agent may use
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and argument schema advertised to the model
    fn spec(&self) -> ToolSpec;

    /// Execute with the model-supplied arguments
    async fn call(&self, arguments: Value) -> Result<Value, ToolError>;
}

/// Tools available to agents, keyed by tool name
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.spec().name, tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Specs for the named tools; names without a registered tool are skipped
    pub fn specs(&self, names: &[String]) -> Vec<ToolSpec> {
        names
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.spec())
            .collect()
    }

    /// Parse raw JSON arguments and run the named tool
    pub async fn call(&self, name: &str, raw_arguments: &str) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let arguments: Value =
            serde_json::from_str(raw_arguments).map_err(|e| ToolError::InvalidArguments {
                tool: name.to_string(),
                message: e.to_string(),
            })?;

        tool.call(arguments).await
    }
}
