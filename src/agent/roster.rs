use super::weather::WEATHER_TOOL_NAME;
use std::collections::HashMap;

/// One agent: its persona, the model it runs on, and the tools it may call
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    pub name: String,
    pub instructions: String,
    pub model: String,
    /// Tool names, resolved against the `ToolRegistry`
    pub tools: Vec<String>,
}

impl AgentProfile {
    pub fn new(name: &str, instructions: &str, model: &str) -> Self {
        Self {
            name: name.to_string(),
            instructions: instructions.to_string(),
            model: model.to_string(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: &str) -> Self {
        self.tools.push(tool.to_string());
        self
    }
}

/// A manager agent and the members it can delegate to
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRoster {
    pub manager: AgentProfile,
    pub members: Vec<AgentProfile>,
}

impl AgentRoster {
    pub fn new(manager: AgentProfile, members: Vec<AgentProfile>) -> Self {
        Self { manager, members }
    }

    /// The engineering-team roster: a manager routing to frontend, backend,
    /// general and weather specialists
    pub fn standard() -> Self {
        let manager = AgentProfile::new(
            "manager-agent",
            "You are the manager AI.\n\
             Route:\n\
             - frontend -> employee-frontend\n\
             - backend -> employee-backend\n\
             - general -> general-question\n\
             - weather -> weather-agent",
            "x-ai/grok-4.1-fast:free",
        );

        let members = vec![
            AgentProfile::new(
                "employee-frontend",
                "You are a frontend engineer.\n\
                 You handle UI, CSS, React, Tailwind, components, layout tasks.",
                "x-ai/grok-4.1-fast:free",
            ),
            AgentProfile::new(
                "employee-backend",
                "You are a backend engineer.\n\
                 You handle Node.js, APIs, databases, server logic.",
                "meta-llama/llama-3.3-70b-instruct:free",
            ),
            AgentProfile::new(
                "general-question",
                "You help with general questions.\n\
                 Answer normally and directly.",
                "kwaipilot/kat-coder-pro:free",
            ),
            AgentProfile::new(
                "weather-agent",
                "You are a weather assistant.\n\
                 Use getWeather to fetch city weather.",
                "openai/gpt-oss-20b:free",
            )
            .with_tool(WEATHER_TOOL_NAME),
        ];

        Self::new(manager, members)
    }

    /// Replace models by agent name; unknown names are ignored
    pub fn with_model_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        let profiles = std::iter::once(&mut self.manager).chain(self.members.iter_mut());
        for profile in profiles {
            if let Some(model) = overrides.get(&profile.name) {
                profile.model = model.clone();
            }
        }
        self
    }

    pub fn member(&self, name: &str) -> Option<&AgentProfile> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }

    /// System prompt for the manager: its own instructions plus the team list
    pub fn manager_prompt(&self) -> String {
        let mut prompt = self.manager.instructions.clone();
        prompt.push_str("\n\nYou supervise these agents:\n");
        for member in &self.members {
            let role = member.instructions.lines().next().unwrap_or_default();
            prompt.push_str(&format!("- {}: {}\n", member.name, role));
        }
        prompt.push_str(
            "\nUse the delegate_task tool to hand a task to the right agent, \
             then answer the user using its result.",
        );
        prompt
    }
}
