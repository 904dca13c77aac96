//! Caption re-basing onto the composite timeline.

use pvid_models::{CaptionSegment, LayerContent, Position, TextStyle, VisualLayer};
use tracing::warn;

use crate::config::EngineConfig;

/// Turn narration-relative caption segments into absolute caption layers.
///
/// Each segment is shifted by the constant `offset` (the intro duration),
/// preserving the transcription's ordering and non-overlap. Windows are
/// clamped to `total_duration`; degenerate segments are dropped.
pub fn rebase_captions(
    segments: &[CaptionSegment],
    offset: f64,
    total_duration: f64,
    config: &EngineConfig,
) -> Vec<VisualLayer> {
    let style = TextStyle {
        font: config.font.clone(),
        font_size: config.caption.font_size,
        color: config.caption.color.clone(),
        stroke_color: config.caption.stroke_color.clone(),
        stroke_width: config.caption.stroke_width,
    };

    let max_width = config.width.saturating_sub(config.caption.horizontal_inset);

    segments
        .iter()
        .filter(|seg| {
            if seg.is_valid() {
                true
            } else {
                warn!(
                    "Dropping caption with non-positive window [{:.3}, {:.3})",
                    seg.start, seg.end
                );
                false
            }
        })
        .map(|seg| {
            let start = (offset + seg.start).min(total_duration);
            let duration = (offset + seg.end).min(total_duration) - start;
            VisualLayer {
                content: LayerContent::Text {
                    text: seg.text.clone(),
                    style: style.clone(),
                    max_width,
                },
                start,
                duration,
                position: Position::BottomCenter {
                    margin: config.caption.bottom_margin,
                },
            }
        })
        .collect()
}
