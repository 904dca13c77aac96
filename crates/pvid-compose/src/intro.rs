//! Intro resolution: the {Disclaimer, Bumper, MainContent} sequence.
//!
//! The intro is an ordered state machine with precomputed absolute
//! offsets. Resolving it up front removes the offset arithmetic from the
//! layering step, which is where off-by-duration defects creep in.

use pvid_models::MediaAsset;

use crate::config::EngineConfig;

/// Stages of the composite, in temporal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroStage {
    Disclaimer,
    Bumper,
    MainContent,
}

/// Resolved intro timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroPlan {
    /// Disclaimer length (0 when absent)
    pub disclaimer_duration: f64,
    /// Bumper length (0 when no logo pair)
    pub bumper_duration: f64,
    /// Seconds of background footage consumed by the bumper backdrop
    pub background_consumed: f64,
}

impl IntroPlan {
    /// Resolve intro timing from the optional assets.
    ///
    /// The bumper exists only for a complete logo pair; a one-sided pair
    /// contributes nothing. The bumper backdrop consumes a leading slice
    /// of the background so the main window never replays those seconds.
    pub fn resolve(
        disclaimer: Option<&MediaAsset>,
        has_logo_pair: bool,
        background: Option<&MediaAsset>,
        config: &EngineConfig,
    ) -> Self {
        let disclaimer_duration = disclaimer
            .map(|d| d.duration.min(config.disclaimer_lead))
            .unwrap_or(0.0);

        let bumper_duration = if has_logo_pair {
            config.bumper_duration
        } else {
            0.0
        };

        let background_consumed = if has_logo_pair {
            background
                .map(|bg| bg.duration.min(bumper_duration))
                .unwrap_or(0.0)
        } else {
            0.0
        };

        Self {
            disclaimer_duration,
            bumper_duration,
            background_consumed,
        }
    }

    /// Combined intro length preceding main content.
    pub fn intro_duration(&self) -> f64 {
        self.disclaimer_duration + self.bumper_duration
    }

    /// Absolute start of a stage on the composite timeline.
    pub fn offset(&self, stage: IntroStage) -> f64 {
        match stage {
            IntroStage::Disclaimer => 0.0,
            IntroStage::Bumper => self.disclaimer_duration,
            IntroStage::MainContent => self.disclaimer_duration + self.bumper_duration,
        }
    }
}
