//! Agents that turn a prompt into a stream of text fragments
//!
//! This module provides:
//! - `AgentCapability`: the interface the HTTP layer streams from
//! - `Supervisor`: a manager agent delegating to a roster of members
//! - `Tool` / `ToolRegistry`: callable tools for members (e.g. `WeatherTool`)

mod capability;
mod roster;
mod supervisor;
mod tool;
mod weather;

pub use capability::{AgentCapability, FragmentStream};
pub use roster::{AgentProfile, AgentRoster};
pub use supervisor::{StepBudget, Supervisor, DELEGATE_TOOL_NAME};
pub use tool::{Tool, ToolRegistry};
pub use weather::{WeatherTool, WEATHER_TOOL_NAME};
