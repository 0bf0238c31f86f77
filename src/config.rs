use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Environment prefix for layered overrides, e.g. `CHAT_GATEWAY_SERVICE__HTTP__PORT`
const ENV_PREFIX: &str = "CHAT_GATEWAY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub agent: AgentConfig,
    pub openrouter: OpenRouterConfig,
    pub elevenlabs: ElevenLabsConfig,
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    /// Deployment environment name (development, production, ...)
    pub environment: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    /// Largest accepted upload on /api/voice
    pub max_audio_bytes: usize,
}

impl HttpConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Cap on LLM generations per chat request, across all agents
    pub max_steps: usize,

    /// Model overrides keyed by agent name
    #[serde(default)]
    pub models: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub app_name: String,
    #[serde(default)]
    pub app_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub voice_id: String,
    pub tts_model_id: String,
    pub output_format: String,
    pub stt_model_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Config {
    /// Load configuration from defaults, an optional file at `path` (extension
    /// resolved by the `config` crate), and the process environment.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            // Service defaults
            .set_default("service.name", "chat-gateway")?
            .set_default("service.environment", "development")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 3001_i64)?
            .set_default("service.http.max_audio_bytes", 25_i64 * 1024 * 1024)?
            // Agent defaults
            .set_default("agent.max_steps", 20_i64)?
            // Vendor defaults
            .set_default("openrouter.api_key", "")?
            .set_default("openrouter.base_url", "https://openrouter.ai/api/v1")?
            .set_default("openrouter.request_timeout_secs", 600_i64)?
            .set_default("openrouter.app_name", "chat-gateway")?
            .set_default("elevenlabs.api_key", "")?
            .set_default("elevenlabs.base_url", "https://api.elevenlabs.io")?
            .set_default("elevenlabs.voice_id", "JBFqnCBsd6RMkjVDRZzb")?
            .set_default("elevenlabs.tts_model_id", "eleven_multilingual_v2")?
            .set_default("elevenlabs.output_format", "mp3_44100_128")?
            .set_default("elevenlabs.stt_model_id", "scribe_v1")?
            .set_default("weather.api_key", "")?
            .set_default("weather.base_url", "https://api.weatherapi.com")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            // Conventional vendor variables win over everything else
            .set_override_option("openrouter.api_key", std::env::var("OPENROUTER_API_KEY").ok())?
            .set_override_option("elevenlabs.api_key", std::env::var("ELEVENLABS_API_KEY").ok())?
            .set_override_option("weather.api_key", std::env::var("WEATHER_API_KEY").ok())?
            .set_override_option("service.environment", std::env::var("APP_ENV").ok())?
            .set_override_option(
                "service.http.port",
                std::env::var("PORT").ok().and_then(|p| p.parse::<i64>().ok()),
            )?
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Names of vendor credentials that are still empty after loading
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.openrouter.api_key.is_empty() {
            missing.push("OPENROUTER_API_KEY");
        }
        if self.elevenlabs.api_key.is_empty() {
            missing.push("ELEVENLABS_API_KEY");
        }
        if self.weather.api_key.is_empty() {
            missing.push("WEATHER_API_KEY");
        }
        missing
    }
}
