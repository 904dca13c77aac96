//! Timeline composition engine.
//!
//! Converts independently-authored, variable-duration assets into one
//! temporally consistent composite plan: visual layers with absolute
//! windows in paint order, plus an audio mix plan. Narration duration is
//! the authoritative clock; everything else is trimmed, offset, or filled
//! around it so no part of the output is ever undefined.

pub mod captions;
pub mod config;
pub mod engine;
pub mod error;
pub mod intro;

pub use captions::rebase_captions;
pub use config::{CaptionStyleConfig, EngineConfig};
pub use engine::{CompositionEngine, CompositionInputs};
pub use error::{ComposeError, ComposeResult};
pub use intro::{IntroPlan, IntroStage};
