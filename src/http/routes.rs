use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_audio_bytes = state.max_audio_bytes;

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Streaming chat
        .route(
            "/api/chat",
            get(handlers::chat_query).post(handlers::chat_body),
        )
        // Speech
        .route(
            "/api/voice",
            post(handlers::voice).layer(DefaultBodyLimit::max(max_audio_bytes)),
        )
        .route("/api/sound", post(handlers::sound))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
