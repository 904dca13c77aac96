//! Resolved media assets.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A media asset resolved to a local, seekable file.
///
/// Created by the asset resolver after fetch + probe; read-only thereafter.
/// `width`/`height` are zero for audio-only assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Original source reference (URL or local path)
    pub source: String,
    /// Local file path
    pub path: PathBuf,
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels (0 for audio)
    pub width: u32,
    /// Height in pixels (0 for audio)
    pub height: u32,
}

impl MediaAsset {
    /// Whether this asset carries a video stream.
    pub fn is_visual(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
