//! Audio tracks in the composite mix.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One audio source in the composite mix.
///
/// `duration` may be shorter than the source file, never longer. The
/// composition engine guarantees `start + duration <= total_duration`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTrack {
    /// Local audio file path
    pub path: PathBuf,
    /// Linear gain multiplier
    #[serde(default = "default_gain")]
    pub gain: f64,
    /// Absolute start on the composite timeline (seconds)
    #[serde(default)]
    pub start: f64,
    /// Playback duration (seconds)
    pub duration: f64,
}

fn default_gain() -> f64 {
    1.0
}

impl AudioTrack {
    /// Full-gain track starting at t=0.
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            gain: 1.0,
            start: 0.0,
            duration,
        }
    }

    /// Set the absolute start offset.
    pub fn with_start(mut self, start: f64) -> Self {
        self.start = start;
        self
    }

    /// Set the gain multiplier.
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Absolute end of this track on the composite timeline.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let track = AudioTrack::new("/tmp/voice.mp3", 12.5);
        assert_eq!(track.gain, 1.0);
        assert_eq!(track.start, 0.0);
        assert_eq!(track.end(), 12.5);
    }

    #[test]
    fn test_with_start_and_gain() {
        let track = AudioTrack::new("/tmp/bgm.mp3", 10.0)
            .with_start(3.0)
            .with_gain(0.1);
        assert_eq!(track.start, 3.0);
        assert_eq!(track.gain, 0.1);
        assert_eq!(track.end(), 13.0);
    }
}
