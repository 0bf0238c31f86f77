//! Error types for the vendor-facing seams
//!
//! `UpstreamError` covers everything that can go wrong talking to the LLM
//! gateway or the speech vendor, and ends a request. `ToolError` covers
//! failures inside a single tool call; those are reported back to the model
//! instead of ending the request.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} error: {message}")]
    Provider {
        service: &'static str,
        message: String,
    },

    #[error("invalid response from {service}: {message}")]
    InvalidResponse {
        service: &'static str,
        message: String,
    },

    #[error("agent step limit of {0} exceeded")]
    StepLimitExceeded(usize),
}

impl UpstreamError {
    pub fn transport(service: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { service, source }
    }

    pub fn invalid_response(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("{0}")]
    Failed(String),
}
