//! Shared data models for the PromoVid backend.
//!
//! This crate provides Serde-serializable types for:
//! - Resolved media assets and audio tracks
//! - Caption segments and user text overlays
//! - Visual layers and the composite plan
//! - The caller-facing video request/response shapes
//! - Encoding configuration

pub mod asset;
pub mod caption;
pub mod encoding;
pub mod overlay;
pub mod plan;
pub mod request;
pub mod track;

// Re-export common types
pub use asset::MediaAsset;
pub use caption::CaptionSegment;
pub use encoding::EncodingConfig;
pub use overlay::{TextOverlayItem, TextStyle};
pub use plan::{CompositePlan, LayerContent, PlanError, Position, Rgb, VisualLayer, TIME_EPSILON};
pub use request::{VideoArtifact, VideoRequest};
pub use track::AudioTrack;
