//! Speech error types.

use thiserror::Error;

pub type SpeechResult<T> = Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    #[error("Synthesis backend '{backend}' failed: {message}")]
    BackendFailed { backend: String, message: String },

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Whisper not found in PATH")]
    WhisperNotFound,

    #[error("espeak not found in PATH")]
    EspeakNotFound,

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl SpeechError {
    pub fn backend_failed(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendFailed {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn transcription_failed(message: impl Into<String>) -> Self {
        Self::TranscriptionFailed(message.into())
    }
}
