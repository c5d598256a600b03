use async_trait::async_trait;

use crate::accent::Accent;
use crate::error::Result;

/// Language code sent with every request. Only English narration is supported.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Request to send to a speech backend
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub language: String,
    pub accent: Accent,
}

impl SpeechRequest {
    /// English request for the given text and accent
    pub fn new(text: impl Into<String>, accent: Accent) -> Self {
        Self {
            text: text.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            accent,
        }
    }
}

/// Encoded audio returned by a speech backend
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// MP3 frames
    pub bytes: Vec<u8>,
}

/// Trait for speech synthesis backends
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize one piece of text into MP3 audio
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SpeechAudio>;

    /// Get the backend name for display
    fn name(&self) -> &'static str;
}
