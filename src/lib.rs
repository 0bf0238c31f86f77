pub mod agent;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod speech;

pub use agent::{
    AgentCapability, AgentProfile, AgentRoster, FragmentStream, Supervisor, Tool, ToolRegistry,
    WeatherTool,
};
pub use config::Config;
pub use error::{ToolError, UpstreamError};
pub use http::{create_router, AppState};
pub use llm::{ChatModel, OpenRouterClient};
pub use speech::{AudioClip, ElevenLabsClient, SpeechToText, TextToSpeech};
