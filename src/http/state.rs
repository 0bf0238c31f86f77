use crate::agent::{AgentCapability, AgentRoster, Supervisor, ToolRegistry, WeatherTool};
use crate::config::Config;
use crate::llm::OpenRouterClient;
use crate::speech::{ElevenLabsClient, SpeechToText, TextToSpeech};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for HTTP handlers
///
/// Everything here is built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Answers chat prompts
    pub agent: Arc<dyn AgentCapability>,

    /// Speech-to-text backend for /api/voice
    pub transcriber: Arc<dyn SpeechToText>,

    /// Text-to-speech backend for /api/sound
    pub synthesizer: Arc<dyn TextToSpeech>,

    /// Step limit passed to every agent invocation
    pub max_steps: usize,

    /// Largest accepted audio upload
    pub max_audio_bytes: usize,

    /// Process start, for /health uptime
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        agent: Arc<dyn AgentCapability>,
        transcriber: Arc<dyn SpeechToText>,
        synthesizer: Arc<dyn TextToSpeech>,
        max_steps: usize,
    ) -> Self {
        Self {
            agent,
            transcriber,
            synthesizer,
            max_steps,
            max_audio_bytes: 25 * 1024 * 1024,
            started_at: Instant::now(),
        }
    }

    pub fn with_max_audio_bytes(mut self, max_audio_bytes: usize) -> Self {
        self.max_audio_bytes = max_audio_bytes;
        self
    }

    /// Wire the production vendors from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = Arc::new(OpenRouterClient::new(config.openrouter.clone())?);
        let tools = ToolRegistry::new().with_tool(Arc::new(WeatherTool::new(config.weather.clone())?));
        let roster = AgentRoster::standard().with_model_overrides(&config.agent.models);
        let supervisor = Supervisor::new(model, roster, tools);

        let speech = Arc::new(ElevenLabsClient::new(config.elevenlabs.clone())?);

        Ok(Self::new(
            Arc::new(supervisor),
            speech.clone(),
            speech,
            config.agent.max_steps,
        )
        .with_max_audio_bytes(config.service.http.max_audio_bytes))
    }
}
