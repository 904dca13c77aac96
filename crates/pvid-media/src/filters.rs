//! FFmpeg filter builders for the renderer.

use pvid_models::{Position, TextStyle};

/// Escape a string for use inside a drawtext `text=` argument.
///
/// Both the drawtext parser and the filter-graph parser consume escapes, so
/// special characters need double treatment.
pub fn escape_drawtext(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\\\\\"),
            '\'' => out.push_str("\\\\\\'"),
            ':' => out.push_str("\\\\:"),
            '%' => out.push_str("\\\\%"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '[' | ']' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap text to an approximate pixel width by inserting newlines.
///
/// drawtext has no native wrapping; estimate characters per line from the
/// average glyph advance (~0.55em).
pub fn wrap_text(text: &str, font_size: u32, max_width: u32) -> String {
    let advance = (font_size as f64 * 0.55).max(1.0);
    let max_chars = ((max_width as f64 / advance) as usize).max(8);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Build a drawtext filter for a timed text layer.
///
/// `enable` windows the text to `[start, end)` on the chain's timeline.
pub fn drawtext(text: &str, style: &TextStyle, position: Position, start: f64, end: f64) -> String {
    let (x_expr, y_expr) = match position {
        Position::Center => ("(w-text_w)/2".to_string(), "(h-text_h)/2".to_string()),
        Position::BottomCenter { margin } => {
            ("(w-text_w)/2".to_string(), format!("h-text_h-{margin}"))
        }
        Position::Pixels { x, y } => (x.to_string(), y.to_string()),
    };

    format!(
        "drawtext=text='{}':font='{}':fontsize={}:fontcolor={}:bordercolor={}:borderw={}:x={}:y={}:enable='between(t,{:.3},{:.3})'",
        escape_drawtext(text),
        style.font,
        style.font_size,
        style.color,
        style.stroke_color,
        style.stroke_width,
        x_expr,
        y_expr,
        start,
        end,
    )
}

/// Overlay position expressions for an image/video layer.
pub fn overlay_position(position: Position) -> (String, String) {
    match position {
        Position::Center => ("(W-w)/2".to_string(), "(H-h)/2".to_string()),
        Position::BottomCenter { margin } => ("(W-w)/2".to_string(), format!("H-h-{margin}")),
        Position::Pixels { x, y } => (x.to_string(), y.to_string()),
    }
}

/// Scale-and-crop chain that covers the full frame regardless of source
/// aspect ratio.
pub fn cover_frame(width: u32, height: u32) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
        w = width,
        h = height
    )
}

/// lavfi color source of fixed size and duration.
pub fn color_source(hex: &str, width: u32, height: u32, fps: u32, duration: f64) -> String {
    format!("color=c={hex}:s={width}x{height}:r={fps}:d={duration:.3}")
}

/// Audio chain for one mix entry: trim to duration, apply gain, delay to
/// its absolute start.
pub fn audio_chain(duration: f64, gain: f64, start: f64) -> String {
    let delay_ms = (start * 1000.0).round() as i64;
    format!(
        "atrim=0:{duration:.3},asetpts=PTS-STARTPTS,volume={gain},adelay={delay_ms}:all=1",
    )
}
