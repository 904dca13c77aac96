//! Caption segments derived from transcription.

use serde::{Deserialize, Serialize};

/// A timed caption unit, relative to the narration track's own t=0.
///
/// Transcription emits these ordered by `start` and non-overlapping; the
/// composition engine relies on that as an input invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSegment {
    /// Caption text
    pub text: String,
    /// Start relative to narration t=0 (seconds)
    pub start: f64,
    /// End relative to narration t=0 (seconds)
    pub end: f64,
}

impl CaptionSegment {
    /// Caption display duration.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the segment has a positive display window.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }
}
