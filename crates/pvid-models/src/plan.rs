//! Visual layers and the composite plan.
//!
//! The composite plan is the sole output of the composition engine and the
//! sole input of the renderer. Layer paint order is sequence order: later
//! layers draw on top.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::overlay::TextStyle;
use crate::track::AudioTrack;

/// Tolerance for floating-point window comparisons (seconds).
pub const TIME_EPSILON: f64 = 1e-6;

/// Flat RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Hex string usable in FFmpeg color arguments.
    pub fn to_hex(self) -> String {
        format!("0x{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// What a visual layer paints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LayerContent {
    /// A window of a video file, starting at `source_start` seconds into
    /// the source. Video layers are always muted; audio goes through the
    /// mix plan.
    Video {
        path: PathBuf,
        source_start: f64,
    },
    /// A still image, optionally scaled. `width`/`height` of `None` keep
    /// the source dimension (aspect preserved when only one is given).
    Image {
        path: PathBuf,
        width: Option<u32>,
        height: Option<u32>,
    },
    /// Rendered text.
    Text {
        text: String,
        style: TextStyle,
        /// Wrap width in pixels
        max_width: u32,
    },
    /// Flat color filler covering the full frame.
    Color { rgb: Rgb },
}

/// Placement of a layer within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Position {
    /// Centered both axes
    Center,
    /// Horizontally centered, bottom edge `margin` pixels above the frame
    /// bottom
    BottomCenter { margin: u32 },
    /// Absolute pixel coordinates of the top-left corner
    Pixels { x: i64, y: i64 },
}

/// A resolved visual layer with an absolute window on the composite
/// timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualLayer {
    pub content: LayerContent,
    /// Absolute start (seconds)
    pub start: f64,
    /// Display duration (seconds)
    pub duration: f64,
    pub position: Position,
}

impl VisualLayer {
    /// Absolute end of this layer's window.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Composite plan validation failure.
///
/// Reaching this given correct trimming logic is a defect in the engine,
/// not a user-facing condition.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("visual layer {index} window [{start:.3}, {end:.3}) exceeds total duration {total:.3}")]
    LayerOutOfRange {
        index: usize,
        start: f64,
        end: f64,
        total: f64,
    },

    #[error("audio track {index} window [{start:.3}, {end:.3}) exceeds total duration {total:.3}")]
    AudioOutOfRange {
        index: usize,
        start: f64,
        end: f64,
        total: f64,
    },

    #[error("negative window on visual layer {index}: start {start:.3}, duration {duration:.3}")]
    NegativeWindow {
        index: usize,
        start: f64,
        duration: f64,
    },
}

/// The fully resolved composite: ordered visual layers (paint order),
/// audio mix entries, and a fixed total duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositePlan {
    /// Visual layers in paint order (later = on top)
    pub layers: Vec<VisualLayer>,
    /// Audio tracks to mix (order has no visual meaning)
    pub audio: Vec<AudioTrack>,
    /// Total composite duration (seconds)
    pub total_duration: f64,
    /// Output frame width
    pub width: u32,
    /// Output frame height
    pub height: u32,
}

impl CompositePlan {
    /// Check every layer and track window against the total duration.
    ///
    /// The engine calls this before handing the plan to the renderer, so
    /// an out-of-range instruction never reaches the encode step.
    pub fn validate(&self) -> Result<(), PlanError> {
        for (index, layer) in self.layers.iter().enumerate() {
            if layer.start < 0.0 || layer.duration < 0.0 {
                return Err(PlanError::NegativeWindow {
                    index,
                    start: layer.start,
                    duration: layer.duration,
                });
            }
            if layer.end() > self.total_duration + TIME_EPSILON {
                return Err(PlanError::LayerOutOfRange {
                    index,
                    start: layer.start,
                    end: layer.end(),
                    total: self.total_duration,
                });
            }
        }
        for (index, track) in self.audio.iter().enumerate() {
            if track.end() > self.total_duration + TIME_EPSILON {
                return Err(PlanError::AudioOutOfRange {
                    index,
                    start: track.start,
                    end: track.end(),
                    total: self.total_duration,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color_layer(start: f64, duration: f64) -> VisualLayer {
        VisualLayer {
            content: LayerContent::Color { rgb: Rgb::BLACK },
            start,
            duration,
            position: Position::Center,
        }
    }

    #[test]
    fn test_validate_ok() {
        let plan = CompositePlan {
            layers: vec![color_layer(0.0, 5.0), color_layer(2.0, 3.0)],
            audio: vec![AudioTrack::new("/tmp/a.mp3", 5.0)],
            total_duration: 5.0,
            width: 1920,
            height: 1080,
        };
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_overlong_layer() {
        let plan = CompositePlan {
            layers: vec![color_layer(3.0, 5.0)],
            audio: vec![],
            total_duration: 5.0,
            width: 1920,
            height: 1080,
        };
        assert!(matches!(
            plan.validate(),
            Err(PlanError::LayerOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_overlong_audio() {
        let plan = CompositePlan {
            layers: vec![],
            audio: vec![AudioTrack::new("/tmp/a.mp3", 6.0).with_start(1.0)],
            total_duration: 5.0,
            width: 1920,
            height: 1080,
        };
        assert!(matches!(
            plan.validate(),
            Err(PlanError::AudioOutOfRange { index: 0, .. })
        ));
    }

    #[test]
    fn test_zero_length_layer_at_boundary_is_valid() {
        // Truncated overlays collapse to a zero-length window at the end
        let plan = CompositePlan {
            layers: vec![color_layer(5.0, 0.0)],
            audio: vec![],
            total_duration: 5.0,
            width: 1920,
            height: 1080,
        };
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb(255, 0, 16).to_hex(), "0xff0010");
    }
}
