//! Speech vendor integration
//!
//! - `SpeechToText`: uploaded audio → transcription text
//! - `TextToSpeech`: text → encoded audio (MP3 by default)
//! - `ElevenLabsClient`: production implementation of both

mod elevenlabs;
mod format;

pub use elevenlabs::ElevenLabsClient;
pub use format::{is_declared_audio, mime_essence, AudioFormat};

use crate::error::UpstreamError;
use bytes::Bytes;

const OCTET_STREAM: &str = "application/octet-stream";

/// An uploaded audio payload
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl AudioClip {
    /// Build a clip, trusting a declared audio MIME type and otherwise
    /// sniffing the bytes
    pub fn new(bytes: Bytes, declared_mime: Option<&str>) -> Self {
        if let Some(declared) = declared_mime.filter(|m| is_declared_audio(m)) {
            return Self {
                bytes,
                mime_type: mime_essence(declared),
            };
        }

        let mime_type = AudioFormat::detect(&bytes)
            .map(|f| f.mime_type())
            .unwrap_or(OCTET_STREAM)
            .to_string();

        Self { bytes, mime_type }
    }

    pub fn format(&self) -> Option<AudioFormat> {
        AudioFormat::from_mime(&self.mime_type)
    }

    /// File name sent with multipart uploads
    pub fn file_name(&self) -> String {
        let extension = self.format().map(|f| f.extension()).unwrap_or("bin");
        format!("audio.{}", extension)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Speech-to-text backend
#[async_trait::async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe a complete clip
    async fn transcribe(&self, clip: AudioClip) -> Result<String, UpstreamError>;
}

/// Text-to-speech backend
#[async_trait::async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize `text`, returning the fully buffered audio
    async fn synthesize(&self, text: &str) -> Result<Bytes, UpstreamError>;
}
