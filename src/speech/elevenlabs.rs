use super::{AudioClip, SpeechToText, TextToSpeech};
use crate::config::ElevenLabsConfig;
use crate::error::UpstreamError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

const SERVICE: &str = "elevenlabs";
const API_KEY_HEADER: &str = "xi-api-key";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// ElevenLabs speech-to-text and text-to-speech client
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build ElevenLabs HTTP client")?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(UpstreamError::Status {
            service: SERVICE,
            status: status.as_u16(),
            body: error_message(&body),
        })
    }
}

/// ElevenLabs reports errors as `{"detail": {"message": ...}}` or `{"detail": "..."}`
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(detail) => detail
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| detail.to_string()),
        None => body.to_string(),
    }
}

#[async_trait]
impl SpeechToText for ElevenLabsClient {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, UpstreamError> {
        info!(
            bytes = clip.len(),
            mime = %clip.mime_type,
            "Transcribing audio"
        );

        let file = Part::bytes(clip.bytes.to_vec())
            .file_name(clip.file_name())
            .mime_str(&clip.mime_type)
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;
        let form = Form::new()
            .text("model_id", self.config.stt_model_id.clone())
            .part("file", file);

        let response = self
            .client
            .post(self.url("/v1/speech-to-text"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;

        let transcription: TranscriptionResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| UpstreamError::invalid_response(SERVICE, e.to_string()))?;

        Ok(transcription.text)
    }
}

#[async_trait]
impl TextToSpeech for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Bytes, UpstreamError> {
        info!(chars = text.chars().count(), "Synthesizing speech");

        let path = format!("/v1/text-to-speech/{}", self.config.voice_id);
        let response = self
            .client
            .post(self.url(&path))
            .query(&[("output_format", self.config.output_format.as_str())])
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&json!({
                "text": text,
                "model_id": self.config.tts_model_id,
            }))
            .send()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))?;

        Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| UpstreamError::transport(SERVICE, e))
    }
}
