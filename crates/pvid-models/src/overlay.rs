//! User-supplied text overlays and text styling.

use serde::{Deserialize, Serialize};

/// Default overlay display duration (seconds)
pub const DEFAULT_OVERLAY_DURATION: f64 = 3.0;
/// Default overlay font size
pub const DEFAULT_OVERLAY_FONT_SIZE: u32 = 100;
/// Default overlay fill color
pub const DEFAULT_OVERLAY_COLOR: &str = "white";
/// Default overlay stroke color
pub const DEFAULT_OVERLAY_STROKE_COLOR: &str = "black";
/// Default overlay stroke width
pub const DEFAULT_OVERLAY_STROKE_WIDTH: u32 = 3;

/// A caller-supplied text overlay with composite-relative timing.
///
/// Overlays are unordered and may overlap each other and captions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextOverlayItem {
    /// Overlay text
    pub text: String,
    /// Absolute start on the composite timeline (seconds)
    #[serde(default)]
    pub start_time: f64,
    /// Display duration (seconds)
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Fill color name or hex
    #[serde(default = "default_color")]
    pub color: String,
    /// Stroke color name or hex
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    /// Stroke width in pixels
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
}

fn default_duration() -> f64 {
    DEFAULT_OVERLAY_DURATION
}
fn default_font_size() -> u32 {
    DEFAULT_OVERLAY_FONT_SIZE
}
fn default_color() -> String {
    DEFAULT_OVERLAY_COLOR.to_string()
}
fn default_stroke_color() -> String {
    DEFAULT_OVERLAY_STROKE_COLOR.to_string()
}
fn default_stroke_width() -> u32 {
    DEFAULT_OVERLAY_STROKE_WIDTH
}

/// Resolved text rendering style for a drawn text layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font family name
    pub font: String,
    /// Font size in points
    pub font_size: u32,
    /// Fill color
    pub color: String,
    /// Stroke color
    pub stroke_color: String,
    /// Stroke width in pixels
    pub stroke_width: u32,
}

impl TextOverlayItem {
    /// Resolve this overlay's style against the selected font.
    pub fn style(&self, font: &str) -> TextStyle {
        TextStyle {
            font: font.to_string(),
            font_size: self.font_size,
            color: self.color.clone(),
            stroke_color: self.stroke_color.clone(),
            stroke_width: self.stroke_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_defaults_from_json() {
        let item: TextOverlayItem = serde_json::from_str(r#"{"text": "Sale"}"#).unwrap();
        assert_eq!(item.start_time, 0.0);
        assert_eq!(item.duration, 3.0);
        assert_eq!(item.font_size, 100);
        assert_eq!(item.color, "white");
        assert_eq!(item.stroke_color, "black");
        assert_eq!(item.stroke_width, 3);
    }

    #[test]
    fn test_overlay_explicit_fields() {
        let item: TextOverlayItem = serde_json::from_str(
            r#"{"text": "Now", "start_time": 9, "duration": 2.5, "color": "red"}"#,
        )
        .unwrap();
        assert_eq!(item.start_time, 9.0);
        assert_eq!(item.duration, 2.5);
        assert_eq!(item.color, "red");
        let style = item.style("Avenir");
        assert_eq!(style.font, "Avenir");
        assert_eq!(style.color, "red");
    }
}
