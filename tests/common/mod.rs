// Shared test doubles for the gateway integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chat_gateway::agent::{AgentCapability, FragmentStream};
use chat_gateway::llm::{ChatMessage, ChatModel, Completion, CompletionStream, ModelEvent};
use chat_gateway::llm::ToolSpec;
use chat_gateway::speech::{AudioClip, SpeechToText, TextToSpeech};
use chat_gateway::{AppState, UpstreamError};
use futures::stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

pub fn upstream_failure(message: &str) -> UpstreamError {
    UpstreamError::Provider {
        service: "scripted",
        message: message.to_string(),
    }
}

// ============================================================================
// Agents
// ============================================================================

/// Agent that replays a fixed list of fragments; `Err` entries become upstream failures
pub struct ScriptedAgent {
    script: Vec<Result<String, String>>,
    pub invocations: AtomicUsize,
    pub last_step_limit: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new(script: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            script: script
                .into_iter()
                .map(|item| item.map(str::to_string).map_err(str::to_string))
                .collect(),
            invocations: AtomicUsize::new(0),
            last_step_limit: AtomicUsize::new(0),
        })
    }
}

impl AgentCapability for ScriptedAgent {
    fn invoke(&self, _prompt: String, step_limit: usize) -> FragmentStream {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        self.last_step_limit.store(step_limit, Ordering::SeqCst);

        let items: Vec<Result<String, UpstreamError>> = self
            .script
            .iter()
            .map(|item| match item {
                Ok(text) => Ok(text.clone()),
                Err(message) => Err(upstream_failure(message)),
            })
            .collect();
        Box::pin(stream::iter(items))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Agent whose fragments are fed by the test through a channel
pub struct ChannelAgent {
    rx: Mutex<Option<mpsc::Receiver<Result<String, UpstreamError>>>>,
}

impl ChannelAgent {
    pub fn new() -> (Arc<Self>, mpsc::Sender<Result<String, UpstreamError>>) {
        let (tx, rx) = mpsc::channel(1);
        (
            Arc::new(Self {
                rx: Mutex::new(Some(rx)),
            }),
            tx,
        )
    }
}

impl AgentCapability for ChannelAgent {
    fn invoke(&self, _prompt: String, _step_limit: usize) -> FragmentStream {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .expect("ChannelAgent invoked twice");
        Box::pin(ReceiverStream::new(rx))
    }

    fn name(&self) -> &str {
        "channel"
    }
}

// ============================================================================
// Speech
// ============================================================================

/// Speech backend returning canned results and recording what it was given
pub struct StubSpeech {
    transcription: Result<String, String>,
    audio: Result<Bytes, String>,
    pub transcribe_calls: AtomicUsize,
    pub synthesize_calls: AtomicUsize,
    pub last_clip: Mutex<Option<AudioClip>>,
    pub last_text: Mutex<Option<String>>,
}

impl StubSpeech {
    pub fn new(transcription: Result<&str, &str>, audio: Result<&'static [u8], &str>) -> Arc<Self> {
        Arc::new(Self {
            transcription: transcription.map(str::to_string).map_err(str::to_string),
            audio: audio.map(Bytes::from_static).map_err(str::to_string),
            transcribe_calls: AtomicUsize::new(0),
            synthesize_calls: AtomicUsize::new(0),
            last_clip: Mutex::new(None),
            last_text: Mutex::new(None),
        })
    }
}

#[async_trait]
impl SpeechToText for StubSpeech {
    async fn transcribe(&self, clip: AudioClip) -> Result<String, UpstreamError> {
        self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_clip.lock().unwrap() = Some(clip);
        self.transcription.clone().map_err(|m| upstream_failure(&m))
    }
}

#[async_trait]
impl TextToSpeech for StubSpeech {
    async fn synthesize(&self, text: &str) -> Result<Bytes, UpstreamError> {
        self.synthesize_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(text.to_string());
        self.audio.clone().map_err(|m| upstream_failure(&m))
    }
}

pub fn state_with(agent: Arc<dyn AgentCapability>, speech: Arc<StubSpeech>) -> AppState {
    AppState::new(agent, speech.clone(), speech, 20)
}

// ============================================================================
// Models
// ============================================================================

/// One recorded model call
#[derive(Debug, Clone)]
pub struct ModelCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<String>,
    pub streaming: bool,
}

/// Chat model replaying queued streams and completions
///
/// Once a queue runs dry, streams are empty and completions are blank.
#[derive(Default)]
pub struct ScriptedModel {
    streams: Mutex<VecDeque<Vec<Result<ModelEvent, UpstreamError>>>>,
    completions: Mutex<VecDeque<Result<Completion, UpstreamError>>>,
    pub calls: Mutex<Vec<ModelCall>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stream(self, events: Vec<Result<ModelEvent, UpstreamError>>) -> Self {
        self.streams.lock().unwrap().push_back(events);
        self
    }

    pub fn with_completion(self, completion: Result<Completion, UpstreamError>) -> Self {
        self.completions.lock().unwrap().push_back(completion);
        self
    }

    pub fn recorded(&self) -> Vec<ModelCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, model: &str, messages: &[ChatMessage], tools: &[ToolSpec], streaming: bool) {
        self.calls.lock().unwrap().push(ModelCall {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
            streaming,
        });
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<Completion, UpstreamError> {
        self.record(model, messages, tools, false);
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Completion::default()))
    }

    async fn stream(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<CompletionStream, UpstreamError> {
        self.record(model, messages, tools, true);
        let events = self.streams.lock().unwrap().pop_front().unwrap_or_default();
        Ok(Box::pin(stream::iter(events)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// SSE parsing
// ============================================================================

/// JSON payloads of the `data:` frames in an event-stream body
pub fn data_frames(body: &str) -> Vec<serde_json::Value> {
    body.split("\n\n")
        .filter_map(|block| {
            block
                .lines()
                .find_map(|line| line.strip_prefix("data:"))
                .map(|data| serde_json::from_str(data.trim_start()).expect("frame is JSON"))
        })
        .collect()
}
