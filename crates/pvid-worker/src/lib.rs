//! Video generation pipeline worker.
//!
//! This crate provides:
//! - The per-request pipeline: fetch, synthesize, transcribe, compose,
//!   render, publish
//! - Narration track building over the TTS backend chain
//! - Environment-driven configuration
//! - Request-scoped temp workspaces with guaranteed cleanup

pub mod config;
pub mod error;
pub mod narration;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{WorkerError, WorkerResult};
pub use narration::{build_narration, NarrationTrack};
pub use pipeline::VideoPipeline;
