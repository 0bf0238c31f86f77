// Integration tests for the speech and health endpoints

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chat_gateway::{create_router, AppState};
use common::{state_with, ScriptedAgent, StubSpeech};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower::ServiceExt;

const MP3_BYTES: &[u8] = &[0xFF, 0xFB, 0x90, 0x64, 0x00, 0x0F, 0xF0, 0x00];

fn app_with(speech: Arc<StubSpeech>) -> axum::Router {
    create_router(state_with(ScriptedAgent::new(vec![]), speech))
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn post(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap()
}

// ============================================================================
// /api/voice
// ============================================================================

#[tokio::test]
async fn test_voice_returns_vendor_transcription_verbatim() {
    let speech = StubSpeech::new(Ok("  Hello, world!  "), Ok(MP3_BYTES));
    let app = app_with(speech.clone());

    let response = app
        .oneshot(post("/api/voice", "audio/webm", Body::from(vec![1u8, 2, 3, 4, 5])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"success": true, "transcription": "  Hello, world!  "})
    );

    let clip = speech.last_clip.lock().unwrap().clone().unwrap();
    assert_eq!(clip.bytes.as_ref(), &[1u8, 2, 3, 4, 5]);
    assert_eq!(clip.mime_type, "audio/webm");
}

#[tokio::test]
async fn test_voice_sniffs_format_when_undeclared() {
    let speech = StubSpeech::new(Ok("ok"), Ok(MP3_BYTES));
    let app = app_with(speech.clone());

    let wav = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    let response = app
        .oneshot(post("/api/voice", "application/octet-stream", Body::from(wav)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let clip = speech.last_clip.lock().unwrap().clone().unwrap();
    assert_eq!(clip.mime_type, "audio/wav");
}

#[tokio::test]
async fn test_voice_vendor_failure_is_500() {
    let speech = StubSpeech::new(Err("quota exceeded"), Ok(MP3_BYTES));
    let app = app_with(speech.clone());

    let response = app
        .oneshot(post("/api/voice", "audio/ogg", Body::from(vec![0u8; 16])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"error": "scripted error: quota exceeded"})
    );
    assert_eq!(speech.transcribe_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_voice_rejects_oversized_upload() {
    let speech = StubSpeech::new(Ok("never"), Ok(MP3_BYTES));
    let state: AppState = state_with(ScriptedAgent::new(vec![]), speech.clone()).with_max_audio_bytes(8);
    let app = create_router(state);

    let response = app
        .oneshot(post("/api/voice", "audio/ogg", Body::from(vec![0u8; 64])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(speech.transcribe_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_voice_trusts_declared_audio_type() {
    let speech = StubSpeech::new(Ok("ok"), Ok(MP3_BYTES));
    let app = app_with(speech.clone());

    let response = app
        .oneshot(post("/api/voice", "audio/aac", Body::from(vec![0u8; 16])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let clip = speech.last_clip.lock().unwrap().clone().unwrap();
    assert_eq!(clip.mime_type, "audio/aac");
}

// ============================================================================
// /api/sound
// ============================================================================

#[tokio::test]
async fn test_sound_returns_vendor_bytes_as_mpeg() {
    let speech = StubSpeech::new(Ok(""), Ok(MP3_BYTES));
    let app = app_with(speech.clone());

    let response = app
        .oneshot(post("/api/sound", "application/json", r#"{"text":"Hello there"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(body_bytes(response).await, MP3_BYTES);
    assert_eq!(
        speech.last_text.lock().unwrap().as_deref(),
        Some("Hello there")
    );
}

#[tokio::test]
async fn test_sound_empty_text_skips_vendor() {
    for body in [r#"{"text":""}"#, "{}"] {
        let speech = StubSpeech::new(Ok(""), Ok(MP3_BYTES));
        let app = app_with(speech.clone());

        let response = app
            .oneshot(post("/api/sound", "application/json", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(body_json(response).await, json!({"error": "No text provided"}));
        assert_eq!(speech.synthesize_calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_sound_without_json_body_skips_vendor() {
    let requests = [
        Request::builder()
            .method(Method::POST)
            .uri("/api/sound")
            .body(Body::empty())
            .unwrap(),
        post("/api/sound", "application/json", Body::empty()),
        post("/api/sound", "text/plain", "Hello there"),
    ];

    for request in requests {
        let speech = StubSpeech::new(Ok(""), Ok(MP3_BYTES));
        let app = app_with(speech.clone());

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"error": "No text provided"}));
        assert_eq!(speech.synthesize_calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_sound_vendor_failure_is_500() {
    let speech = StubSpeech::new(Ok(""), Err("voice not found"));
    let app = app_with(speech);

    let response = app
        .oneshot(post("/api/sound", "application/json", r#"{"text":"Hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({"error": "scripted error: voice not found"})
    );
}

// ============================================================================
// /health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = app_with(StubSpeech::new(Ok(""), Ok(MP3_BYTES)));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
}
