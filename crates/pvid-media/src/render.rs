//! Renderer: composite plan -> encoded output file.
//!
//! The whole plan becomes a single FFmpeg invocation: a lavfi color base of
//! the full composite duration, one overlay/drawtext step per visual layer
//! in paint order, and an `amix` of the delayed, gain-adjusted audio
//! tracks. Encode failure is terminal; there is no partial-file success.

use std::path::Path;

use tracing::info;

use pvid_models::{CompositePlan, EncodingConfig, LayerContent, VisualLayer};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters;

/// Render a composite plan to `output`.
///
/// The plan must already be validated; the renderer re-checks as a guard
/// since an out-of-range window here is an engine defect.
pub async fn render_plan(
    plan: &CompositePlan,
    encoding: &EncodingConfig,
    output: impl AsRef<Path>,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    plan.validate()
        .map_err(|e| MediaError::InvalidMedia(e.to_string()))?;

    let cmd = build_render_command(plan, encoding, output.as_ref());
    info!(
        layers = plan.layers.len(),
        audio = plan.audio.len(),
        duration = plan.total_duration,
        "Rendering composite to {}",
        output.as_ref().display()
    );
    runner.run(&cmd).await
}

/// Build the FFmpeg command for a plan.
pub fn build_render_command(
    plan: &CompositePlan,
    encoding: &EncodingConfig,
    output: &Path,
) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new(output);
    let mut graph: Vec<String> = Vec::new();

    // Base canvas: black for the entire composite, so no frame is ever
    // undefined even if a layer window has a gap.
    graph.push(format!(
        "{}[v0]",
        filters::color_source(
            "0x000000",
            plan.width,
            plan.height,
            encoding.fps,
            plan.total_duration
        )
    ));

    let mut stage = 0usize;
    let mut aux = 0usize;

    for layer in &plan.layers {
        // Truncated layers can collapse to zero length; nothing to paint.
        if layer.duration <= 0.0 {
            continue;
        }
        match &layer.content {
            LayerContent::Video { path, source_start } => {
                let input = cmd.input(path);
                let label = format!("x{aux}");
                aux += 1;
                graph.push(format!(
                    "[{input}:v]trim=start={:.3}:duration={:.3},setpts=PTS-STARTPTS,{},setpts=PTS+{:.3}/TB[{label}]",
                    source_start,
                    layer.duration,
                    filters::cover_frame(plan.width, plan.height),
                    layer.start,
                ));
                graph.push(overlay_step(&mut stage, &label, layer));
            }
            LayerContent::Image {
                path,
                width,
                height,
            } => {
                let input = cmd.input_with_args(path, ["-loop", "1"]);
                let label = format!("x{aux}");
                aux += 1;
                graph.push(format!(
                    "[{input}:v]format=rgba{},setpts=PTS+{:.3}/TB[{label}]",
                    image_scale(*width, *height),
                    layer.start,
                ));
                graph.push(overlay_step(&mut stage, &label, layer));
            }
            LayerContent::Text {
                text,
                style,
                max_width,
            } => {
                let wrapped = filters::wrap_text(text, style.font_size, *max_width);
                let next = stage + 1;
                graph.push(format!(
                    "[v{stage}]{}[v{next}]",
                    filters::drawtext(&wrapped, style, layer.position, layer.start, layer.end()),
                ));
                stage = next;
            }
            LayerContent::Color { rgb } => {
                let label = format!("x{aux}");
                aux += 1;
                graph.push(format!(
                    "{},setpts=PTS+{:.3}/TB[{label}]",
                    filters::color_source(
                        &rgb.to_hex(),
                        plan.width,
                        plan.height,
                        encoding.fps,
                        layer.duration
                    ),
                    layer.start,
                ));
                graph.push(overlay_step(&mut stage, &label, layer));
            }
        }
    }

    // Audio mix: each track delayed to its absolute start, then summed
    // without normalization (clipping over failing on overflow).
    if plan.audio.is_empty() {
        graph.push(format!(
            "anullsrc=channel_layout=stereo:sample_rate=44100:d={:.3}[aout]",
            plan.total_duration
        ));
    } else {
        let mut labels = Vec::new();
        for track in &plan.audio {
            let input = cmd.input(&track.path);
            let label = format!("a{}", labels.len());
            graph.push(format!(
                "[{input}:a]{}[{label}]",
                filters::audio_chain(track.duration, track.gain, track.start),
            ));
            labels.push(format!("[{label}]"));
        }
        if labels.len() == 1 {
            graph.push(format!(
                "{}atrim=0:{:.3}[aout]",
                labels[0], plan.total_duration
            ));
        } else {
            graph.push(format!(
                "{}amix=inputs={}:duration=longest:normalize=0,atrim=0:{:.3}[aout]",
                labels.concat(),
                labels.len(),
                plan.total_duration
            ));
        }
    }

    cmd.filter_complex(graph.join(";"));
    cmd.map(format!("[v{stage}]"));
    cmd.map("[aout]");
    cmd.output_args(encoding.to_ffmpeg_args());
    cmd.output_args(["-t".to_string(), format!("{:.3}", plan.total_duration)]);
    cmd
}

/// Overlay an auxiliary stream onto the current stage.
fn overlay_step(stage: &mut usize, label: &str, layer: &VisualLayer) -> String {
    let (x, y) = filters::overlay_position(layer.position);
    let next = *stage + 1;
    let step = format!(
        "[v{stage}][{label}]overlay={x}:{y}:eof_action=pass:enable='between(t,{:.3},{:.3})'[v{next}]",
        layer.start,
        layer.end(),
    );
    *stage = next;
    step
}

/// Scale clause for image layers.
fn image_scale(width: Option<u32>, height: Option<u32>) -> String {
    match (width, height) {
        (Some(w), Some(h)) => format!(",scale={w}:{h}"),
        (Some(w), None) => format!(",scale={w}:-1"),
        (None, Some(h)) => format!(",scale=-1:{h}"),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvid_models::{AudioTrack, Position, Rgb, TextStyle};
    use std::path::PathBuf;

    fn plan_with(layers: Vec<VisualLayer>, audio: Vec<AudioTrack>) -> CompositePlan {
        CompositePlan {
            layers,
            audio,
            total_duration: 10.0,
            width: 1920,
            height: 1080,
        }
    }

    #[test]
    fn test_base_canvas_and_duration() {
        let plan = plan_with(vec![], vec![]);
        let cmd = build_render_command(&plan, &EncodingConfig::default(), Path::new("/tmp/o.mp4"));
        let args = cmd.build_args().join(" ");
        assert!(args.contains("color=c=0x000000:s=1920x1080:r=24:d=10.000[v0]"));
        assert!(args.contains("anullsrc"));
        assert!(args.ends_with("-t 10.000 /tmp/o.mp4"));
    }

    #[test]
    fn test_video_layer_trims_from_source_start() {
        let plan = plan_with(
            vec![VisualLayer {
                content: LayerContent::Video {
                    path: PathBuf::from("/tmp/bg.mp4"),
                    source_start: 4.0,
                },
                start: 7.0,
                duration: 3.0,
                position: Position::Center,
            }],
            vec![],
        );
        let cmd = build_render_command(&plan, &EncodingConfig::default(), Path::new("/tmp/o.mp4"));
        let args = cmd.build_args().join(" ");
        assert!(args.contains("trim=start=4.000:duration=3.000"));
        assert!(args.contains("setpts=PTS+7.000/TB"));
        assert!(args.contains("enable='between(t,7.000,10.000)'"));
    }

    #[test]
    fn test_zero_duration_layer_skipped() {
        let plan = plan_with(
            vec![VisualLayer {
                content: LayerContent::Color { rgb: Rgb::BLACK },
                start: 10.0,
                duration: 0.0,
                position: Position::Center,
            }],
            vec![],
        );
        let cmd = build_render_command(&plan, &EncodingConfig::default(), Path::new("/tmp/o.mp4"));
        let args = cmd.build_args().join(" ");
        // Only the base canvas remains; final map is still [v0]
        assert!(args.contains("-map [v0]"));
    }

    #[test]
    fn test_text_layer_draws_on_chain() {
        let plan = plan_with(
            vec![VisualLayer {
                content: LayerContent::Text {
                    text: "Sale".to_string(),
                    style: TextStyle {
                        font: "Avenir".to_string(),
                        font_size: 100,
                        color: "white".to_string(),
                        stroke_color: "black".to_string(),
                        stroke_width: 3,
                    },
                    max_width: 1720,
                },
                start: 2.0,
                duration: 3.0,
                position: Position::Center,
            }],
            vec![],
        );
        let cmd = build_render_command(&plan, &EncodingConfig::default(), Path::new("/tmp/o.mp4"));
        let args = cmd.build_args().join(" ");
        assert!(args.contains("drawtext=text='Sale'"));
        assert!(args.contains("-map [v1]"));
    }

    #[test]
    fn test_two_audio_tracks_amixed() {
        let plan = plan_with(
            vec![],
            vec![
                AudioTrack::new("/tmp/bgm.mp3", 10.0).with_gain(0.1),
                AudioTrack::new("/tmp/voice.mp3", 7.0).with_start(3.0),
            ],
        );
        let cmd = build_render_command(&plan, &EncodingConfig::default(), Path::new("/tmp/o.mp4"));
        let args = cmd.build_args().join(" ");
        assert!(args.contains("volume=0.1"));
        assert!(args.contains("adelay=3000:all=1"));
        assert!(args.contains("amix=inputs=2:duration=longest:normalize=0"));
        assert!(args.contains("atrim=0:10.000[aout]"));
    }

    #[test]
    fn test_single_audio_track_not_amixed() {
        let plan = plan_with(vec![], vec![AudioTrack::new("/tmp/voice.mp3", 8.0)]);
        let cmd = build_render_command(&plan, &EncodingConfig::default(), Path::new("/tmp/o.mp4"));
        let args = cmd.build_args().join(" ");
        assert!(!args.contains("amix"));
        assert!(args.contains("[a0]atrim=0:10.000[aout]"));
    }
}
