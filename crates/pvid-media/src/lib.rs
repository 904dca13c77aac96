//! FFmpeg CLI wrapper for media processing.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with `filter_complex` support
//! - A runner with timeout and cancellation
//! - Media probing (duration, dimensions) via ffprobe
//! - Asset fetch (remote URL or local path) into a request workspace
//! - Logo download with white-background removal
//! - The renderer: composite plan -> encoded output file

pub mod command;
pub mod error;
pub mod fetch;
pub mod filters;
pub mod logo;
pub mod probe;
pub mod render;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use fetch::{fetch_asset, resolve_asset};
pub use logo::fetch_logo;
pub use probe::{probe_media, MediaInfo};
pub use render::render_plan;
