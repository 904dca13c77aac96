//! Caller-facing request and response shapes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::overlay::TextOverlayItem;

/// A video generation request.
///
/// Only `narration_text` and `output_name` are required; every asset
/// reference falls back to the configured default (or is omitted entirely
/// for the optional layers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRequest {
    /// Text to narrate (must be non-empty)
    pub narration_text: String,
    /// Output identifier, also used as the storage key
    pub output_name: String,
    /// Template/background video reference (URL or local path)
    #[serde(default)]
    pub template_video: Option<String>,
    /// Client company logo reference
    #[serde(default)]
    pub client_logo_url: Option<String>,
    /// User company logo reference
    #[serde(default)]
    pub user_logo_url: Option<String>,
    /// Background music reference
    #[serde(default)]
    pub background_music: Option<String>,
    /// Disclaimer intro video reference
    #[serde(default)]
    pub disclaimer_video: Option<String>,
    /// User text overlays
    #[serde(default)]
    pub text_overlays: Vec<TextOverlayItem>,
    /// Font for captions and overlays
    #[serde(default)]
    pub font: Option<String>,
    /// Publish to object storage, or return the local file
    #[serde(default = "default_publish")]
    pub publish: bool,
}

fn default_publish() -> bool {
    true
}

/// The produced artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoArtifact {
    /// Uploaded and addressable through the CDN
    Published { url: String },
    /// Rendered locally, not uploaded
    Local { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_request() {
        let req: VideoRequest = serde_json::from_str(
            r#"{"narration_text": "Hello world", "output_name": "demo.mp4"}"#,
        )
        .unwrap();
        assert!(req.publish);
        assert!(req.template_video.is_none());
        assert!(req.text_overlays.is_empty());
    }

    #[test]
    fn test_full_request() {
        let req: VideoRequest = serde_json::from_str(
            r#"{
                "narration_text": "Welcome aboard",
                "output_name": "welcome.mp4",
                "template_video": "https://cdn.example.com/bg.mp4",
                "client_logo_url": "https://cdn.example.com/a.png",
                "user_logo_url": "https://cdn.example.com/b.png",
                "text_overlays": [{"text": "Sale", "start_time": 9}],
                "publish": false
            }"#,
        )
        .unwrap();
        assert!(!req.publish);
        assert_eq!(req.text_overlays.len(), 1);
        assert_eq!(req.text_overlays[0].duration, 3.0);
    }
}
