/// Audio container formats accepted for transcription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Ogg,
    Mp3,
    Webm,
    Mp4,
    Flac,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Mp4 => "audio/mp4",
            AudioFormat::Flac => "audio/flac",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Ogg => "ogg",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Webm => "webm",
            AudioFormat::Mp4 => "m4a",
            AudioFormat::Flac => "flac",
        }
    }

    /// Detect format from magic bytes
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WAVE" {
            return Some(AudioFormat::Wav);
        }
        if data.starts_with(b"OggS") {
            return Some(AudioFormat::Ogg);
        }
        if data.starts_with(b"fLaC") {
            return Some(AudioFormat::Flac);
        }
        // ID3 tag or bare MPEG frame sync
        if data.starts_with(b"ID3") || (data[0] == 0xFF && data[1] & 0xE0 == 0xE0) {
            return Some(AudioFormat::Mp3);
        }
        if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            return Some(AudioFormat::Webm);
        }
        if data.len() >= 8 && &data[4..8] == b"ftyp" {
            return Some(AudioFormat::Mp4);
        }

        None
    }

    /// Map a MIME type (parameters ignored) to a known container
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime_essence(mime).as_str() {
            "audio/wav" | "audio/wave" | "audio/x-wav" => Some(AudioFormat::Wav),
            "audio/ogg" => Some(AudioFormat::Ogg),
            "audio/mpeg" | "audio/mp3" => Some(AudioFormat::Mp3),
            "audio/webm" | "video/webm" => Some(AudioFormat::Webm),
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some(AudioFormat::Mp4),
            "audio/flac" | "audio/x-flac" => Some(AudioFormat::Flac),
            _ => None,
        }
    }
}

/// Lowercased `type/subtype` with parameters stripped
pub fn mime_essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a declared upload type is trusted as-is: any `audio/*`, or `video/webm`
pub fn is_declared_audio(mime: &str) -> bool {
    let essence = mime_essence(mime);
    match essence.split_once('/') {
        Some(("audio", subtype)) => !subtype.is_empty(),
        _ => essence == "video/webm",
    }
}
