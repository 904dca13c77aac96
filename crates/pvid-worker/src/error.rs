//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Pipeline failure, wrapped with the originating stage's name.
///
/// Each stage either fully succeeds or aborts the whole request; there is
/// no partial-success video.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Asset fetch failed: {0}")]
    FetchFailed(String),

    #[error("Narration synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Composition failed: {0}")]
    Composition(#[from] pvid_compose::ComposeError),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn fetch_failed(msg: impl std::fmt::Display) -> Self {
        Self::FetchFailed(msg.to_string())
    }

    pub fn synthesis_failed(msg: impl std::fmt::Display) -> Self {
        Self::SynthesisFailed(msg.to_string())
    }

    pub fn transcription_failed(msg: impl std::fmt::Display) -> Self {
        Self::TranscriptionFailed(msg.to_string())
    }

    pub fn render_failed(msg: impl std::fmt::Display) -> Self {
        Self::RenderFailed(msg.to_string())
    }

    pub fn publish_failed(msg: impl std::fmt::Display) -> Self {
        Self::PublishFailed(msg.to_string())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
