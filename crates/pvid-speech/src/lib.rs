//! Speech collaborators.
//!
//! This crate provides:
//! - An ordered text-to-speech backend chain (`SynthesisBackend`), primary
//!   ElevenLabs over HTTPS with a local espeak fallback
//! - Whisper CLI transcription returning ordered caption segments

pub mod error;
pub mod synthesis;
pub mod transcribe;

pub use error::{SpeechError, SpeechResult};
pub use synthesis::{
    default_backends, synthesize, ElevenLabsBackend, ElevenLabsConfig, EspeakBackend,
    SynthesisBackend, SynthesizedAudio,
};
pub use transcribe::{transcribe_audio, TranscriberConfig};
