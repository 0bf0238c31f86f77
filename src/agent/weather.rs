use super::tool::Tool;
use crate::config::WeatherConfig;
use crate::error::ToolError;
use crate::llm::ToolSpec;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

pub const WEATHER_TOOL_NAME: &str = "getWeather";

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
}

/// Current-weather lookup against WeatherAPI.com
pub struct WeatherTool {
    client: Client,
    config: WeatherConfig,
}

impl WeatherTool {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build weather HTTP client")?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: WEATHER_TOOL_NAME.to_string(),
            description: "Fetch current weather using WeatherAPI.com".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "City name to fetch weather for"
                    }
                },
                "required": ["city"]
            }),
        }
    }

    async fn call(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: WeatherArgs =
            serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments {
                tool: WEATHER_TOOL_NAME.to_string(),
                message: e.to_string(),
            })?;

        info!("Fetching weather for {}", args.city);

        let url = format!(
            "{}/v1/current.json",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.config.api_key.as_str()),
                ("q", args.city.as_str()),
                ("aqi", "yes"),
            ])
            .send()
            .await
            .map_err(|e| ToolError::Failed(format!("Failed to fetch weather data: {}", e)))?;

        if !response.status().is_success() {
            warn!("Weather API returned {}", response.status());
            return Err(ToolError::Failed("Failed to fetch weather data".to_string()));
        }

        response
            .json()
            .await
            .map_err(|e| ToolError::Failed(format!("Failed to fetch weather data: {}", e)))
    }
}
