use crate::agent::FragmentStream;
use axum::response::sse::Event;
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use tracing::{debug, warn};
use uuid::Uuid;

/// Payload of one chat event-stream frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChatFrame {
    Content { content: String },
    Done { done: bool },
    Error { error: String },
}

impl ChatFrame {
    pub fn content(text: impl Into<String>) -> Self {
        ChatFrame::Content {
            content: text.into(),
        }
    }

    pub fn done() -> Self {
        ChatFrame::Done { done: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ChatFrame::Error {
            error: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChatFrame::Content { .. })
    }

    /// Render as `data: <json>\n\n`
    pub fn into_event(self) -> Event {
        Event::default().data(serde_json::to_string(&self).unwrap_or_default())
    }
}

/// Turn agent fragments into frames: one content frame per fragment, then
/// exactly one `done` or `error` frame
///
/// The next fragment is only pulled once the previous frame has been taken by
/// the transport. Dropping the returned stream drops `fragments`.
pub fn relay_fragments(fragments: FragmentStream) -> impl Stream<Item = ChatFrame> {
    async_stream::stream! {
        let mut fragments = fragments;
        loop {
            match fragments.next().await {
                Some(Ok(text)) => yield ChatFrame::content(text),
                Some(Err(err)) => {
                    yield ChatFrame::error(err.to_string());
                    break;
                }
                None => {
                    yield ChatFrame::done();
                    break;
                }
            }
        }
    }
}

/// `relay_fragments` encoded as SSE events, with per-request logging
pub fn sse_events(
    request_id: Uuid,
    fragments: FragmentStream,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let mut sent = 0usize;
    relay_fragments(fragments).map(move |frame| {
        match &frame {
            ChatFrame::Content { content } => {
                sent += 1;
                debug!(%request_id, seq = sent, "Streaming chunk: {}", content);
            }
            ChatFrame::Done { .. } => debug!(%request_id, fragments = sent, "Chat stream complete"),
            ChatFrame::Error { error } => warn!(%request_id, fragments = sent, "Chat error: {}", error),
        }
        Ok(frame.into_event())
    })
}
