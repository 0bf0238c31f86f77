use super::error::ApiError;
use super::relay::sse_events;
use super::state::AppState;
use crate::speech::AudioClip;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json,
    },
};
use chrono::Utc;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::{error, info};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// User prompt; required and non-blank
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SoundRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub success: bool,
    pub transcription: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    /// Seconds since startup
    pub uptime: f64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/chat?prompt=...
/// Stream an agent answer as server-sent events
pub async fn chat_query(
    State(state): State<AppState>,
    Query(req): Query<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    open_chat_stream(state, req.prompt)
}

/// POST /api/chat
/// Same as GET, with the prompt in a JSON body (the query string also works)
pub async fn chat_body(
    State(state): State<AppState>,
    Query(query): Query<ChatRequest>,
    body: Option<Json<ChatRequest>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let prompt = body.and_then(|Json(req)| req.prompt).or(query.prompt);
    open_chat_stream(state, prompt)
}

fn open_chat_stream(
    state: AppState,
    prompt: Option<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let prompt = match prompt {
        Some(p) if !p.trim().is_empty() => p,
        _ => return Err(ApiError::bad_request("Prompt is required")),
    };

    let request_id = Uuid::new_v4();
    info!(%request_id, agent = state.agent.name(), "Received prompt: {}", prompt);

    let fragments = state.agent.invoke(prompt, state.max_steps);
    Ok(Sse::new(sse_events(request_id, fragments)).keep_alive(KeepAlive::default()))
}

/// POST /api/voice
/// Transcribe a raw audio upload
pub async fn voice(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<VoiceResponse>, ApiError> {
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let clip = AudioClip::new(body, declared);

    info!(bytes = clip.len(), mime = %clip.mime_type, "Received audio for transcription");

    let transcription = state.transcriber.transcribe(clip).await.map_err(|e| {
        error!("Transcription failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(VoiceResponse {
        success: true,
        transcription,
    }))
}

/// POST /api/sound
/// Synthesize speech and return it as MP3; an absent or unparsable body counts
/// as missing text
pub async fn sound(
    State(state): State<AppState>,
    body: Option<Json<SoundRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let text = match body.and_then(|Json(req)| req.text) {
        Some(text) if !text.is_empty() => text,
        _ => return Err(ApiError::bad_request("No text provided")),
    };

    let audio = state.synthesizer.synthesize(&text).await.map_err(|e| {
        error!("Speech synthesis failed: {}", e);
        ApiError::from(e)
    })?;

    info!(bytes = audio.len(), "Synthesized speech");

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/mpeg")],
        audio,
    ))
}

/// GET /health
/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            uptime: state.started_at.elapsed().as_secs_f64(),
        }),
    )
}
