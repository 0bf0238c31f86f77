//! HTTP API server
//!
//! This module provides the public endpoints:
//! - GET/POST /api/chat - Stream an agent answer as server-sent events
//! - POST /api/voice - Transcribe an audio upload
//! - POST /api/sound - Synthesize speech (audio/mpeg)
//! - GET /health - Health check

mod error;
mod handlers;
mod relay;
mod routes;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use relay::{relay_fragments, ChatFrame};
pub use routes::create_router;
pub use state::AppState;
