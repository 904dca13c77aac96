//! Engine configuration.
//!
//! Every tunable the engine consults lives here explicitly, rather than
//! being read ad hoc from the environment at the point of use.

use serde::{Deserialize, Serialize};

use pvid_models::Rgb;

/// Default output frame width
pub const DEFAULT_WIDTH: u32 = 1920;
/// Default output frame height
pub const DEFAULT_HEIGHT: u32 = 1080;
/// Default font family
pub const DEFAULT_FONT: &str = "Avenir";
/// Seconds of the disclaimer clip shown before everything else
pub const DEFAULT_DISCLAIMER_LEAD: f64 = 3.0;
/// Fixed logo bumper window length
pub const DEFAULT_BUMPER_DURATION: f64 = 4.0;
/// Fixed corner logo edge length in pixels
pub const DEFAULT_CORNER_LOGO_SIZE: u32 = 180;
/// Corner logo distance from the frame edges
pub const DEFAULT_CORNER_LOGO_MARGIN: u32 = 30;
/// Background music gain under the whole composite
pub const DEFAULT_MUSIC_GAIN: f64 = 0.1;

/// Caption rendering style defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionStyleConfig {
    pub font_size: u32,
    pub color: String,
    pub stroke_color: String,
    pub stroke_width: u32,
    /// Caption baseline distance from the frame bottom
    pub bottom_margin: u32,
    /// Total horizontal inset for caption wrapping
    pub horizontal_inset: u32,
}

impl Default for CaptionStyleConfig {
    fn default() -> Self {
        Self {
            font_size: 30,
            color: "yellow".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 2,
            bottom_margin: 150,
            horizontal_inset: 100,
        }
    }
}

/// Composition engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Output frame width
    pub width: u32,
    /// Output frame height
    pub height: u32,
    /// Font for captions and overlays
    pub font: String,
    /// Disclaimer lead duration (seconds)
    pub disclaimer_lead: f64,
    /// Logo bumper window length (seconds)
    pub bumper_duration: f64,
    /// Corner logo edge length (pixels)
    pub corner_logo_size: u32,
    /// Corner logo margin from frame edges (pixels)
    pub corner_logo_margin: u32,
    /// Background music gain
    pub music_gain: f64,
    /// Caption style
    pub caption: CaptionStyleConfig,
    /// Total horizontal inset for overlay text wrapping
    pub overlay_inset: u32,
    /// Filler color where no background footage is available
    pub filler_color: Rgb,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            font: DEFAULT_FONT.to_string(),
            disclaimer_lead: DEFAULT_DISCLAIMER_LEAD,
            bumper_duration: DEFAULT_BUMPER_DURATION,
            corner_logo_size: DEFAULT_CORNER_LOGO_SIZE,
            corner_logo_margin: DEFAULT_CORNER_LOGO_MARGIN,
            music_gain: DEFAULT_MUSIC_GAIN,
            caption: CaptionStyleConfig::default(),
            overlay_inset: 200,
            filler_color: Rgb::BLACK,
        }
    }
}

impl EngineConfig {
    /// Bumper logo display width (half the frame).
    pub fn bumper_logo_width(&self) -> u32 {
        self.width / 2
    }

    /// Display window of each bumper logo (half the bumper).
    pub fn bumper_logo_duration(&self) -> f64 {
        self.bumper_duration / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = EngineConfig::default();
        assert_eq!(config.disclaimer_lead, 3.0);
        assert_eq!(config.bumper_duration, 4.0);
        assert_eq!(config.music_gain, 0.1);
        assert_eq!(config.corner_logo_size, 180);
        assert_eq!(config.bumper_logo_width(), 960);
        assert_eq!(config.bumper_logo_duration(), 2.0);
        assert_eq!(config.caption.font_size, 30);
        assert_eq!(config.caption.color, "yellow");
    }
}
