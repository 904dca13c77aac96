//! The composition engine.
//!
//! Resolution order is fixed: disclaimer, logo bumper, main background
//! window, corner logos, captions, user overlays. Later layers paint on
//! top, so caller content always wins visually. Total duration is
//! `intro + narration` exactly; every window is truncated here, at
//! composition time, so the renderer never sees an out-of-range
//! instruction.

use std::path::PathBuf;

use tracing::{debug, info};

use pvid_models::{
    AudioTrack, CaptionSegment, CompositePlan, LayerContent, MediaAsset, Position,
    TextOverlayItem, VisualLayer, TIME_EPSILON,
};

use crate::captions::rebase_captions;
use crate::config::EngineConfig;
use crate::error::{ComposeError, ComposeResult};
use crate::intro::{IntroPlan, IntroStage};

/// Everything the engine needs to resolve one composite.
#[derive(Debug)]
pub struct CompositionInputs {
    /// Background/template video (missing degrades to flat color)
    pub background: Option<MediaAsset>,
    /// Disclaimer intro clip
    pub disclaimer: Option<MediaAsset>,
    /// Processed client logo PNG
    pub client_logo: Option<PathBuf>,
    /// Processed user logo PNG
    pub user_logo: Option<PathBuf>,
    /// Narration audio file
    pub narration_path: PathBuf,
    /// Narration duration, probed once and authoritative
    pub narration_duration: f64,
    /// Background music (missing degrades to no music)
    pub music: Option<MediaAsset>,
    /// Transcription-derived caption segments
    pub captions: Vec<CaptionSegment>,
    /// User text overlays
    pub overlays: Vec<TextOverlayItem>,
}

/// Timeline composition engine.
#[derive(Debug, Clone)]
pub struct CompositionEngine {
    config: EngineConfig,
}

impl CompositionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a composite plan from the inputs.
    pub fn compose(&self, inputs: &CompositionInputs) -> ComposeResult<CompositePlan> {
        if inputs.narration_duration <= 0.0 || !inputs.narration_duration.is_finite() {
            return Err(ComposeError::InvalidNarration(inputs.narration_duration));
        }

        let cfg = &self.config;

        // A one-sided logo pair is deliberately treated as no pair at all:
        // no bumper, no corner logos.
        let logo_pair = match (&inputs.client_logo, &inputs.user_logo) {
            (Some(client), Some(user)) => Some((client.clone(), user.clone())),
            _ => None,
        };

        let intro = IntroPlan::resolve(
            inputs.disclaimer.as_ref(),
            logo_pair.is_some(),
            inputs.background.as_ref(),
            cfg,
        );
        let total = intro.intro_duration() + inputs.narration_duration;

        debug!(
            disclaimer = intro.disclaimer_duration,
            bumper = intro.bumper_duration,
            narration = inputs.narration_duration,
            total,
            "Resolved intro timing"
        );

        let mut layers = Vec::new();

        // 1. Disclaimer, trimmed to the fixed lead, front of everything.
        if let Some(disclaimer) = &inputs.disclaimer {
            layers.push(VisualLayer {
                content: LayerContent::Video {
                    path: disclaimer.path.clone(),
                    source_start: 0.0,
                },
                start: intro.offset(IntroStage::Disclaimer),
                duration: intro.disclaimer_duration,
                position: Position::Center,
            });
        }

        // 2. Logo bumper: background slice backdrop, then each logo for
        // half the window.
        if let Some((client_logo, user_logo)) = &logo_pair {
            self.push_bumper_layers(&mut layers, inputs, &intro, client_logo, user_logo);
        }

        // 3. Main background window, starting after the bumper-consumed
        // slice. Absent or insufficient footage becomes flat color for the
        // exact required duration.
        let main_start = intro.offset(IntroStage::MainContent);
        let remaining = inputs
            .background
            .as_ref()
            .map(|bg| bg.duration - intro.background_consumed)
            .unwrap_or(0.0);

        match inputs.background.as_ref() {
            Some(bg) if remaining + TIME_EPSILON >= inputs.narration_duration => {
                layers.push(VisualLayer {
                    content: LayerContent::Video {
                        path: bg.path.clone(),
                        source_start: intro.background_consumed,
                    },
                    start: main_start,
                    duration: inputs.narration_duration,
                    position: Position::Center,
                });
            }
            _ => {
                info!(
                    remaining,
                    required = inputs.narration_duration,
                    "Background footage missing or insufficient, substituting flat color"
                );
                layers.push(VisualLayer {
                    content: LayerContent::Color {
                        rgb: cfg.filler_color,
                    },
                    start: main_start,
                    duration: inputs.narration_duration,
                    position: Position::Center,
                });
            }
        }

        // 4. Fixed corner logos over the full main window.
        if let Some((client_logo, user_logo)) = &logo_pair {
            let size = cfg.corner_logo_size;
            let margin = cfg.corner_logo_margin as i64;
            let right_x = cfg.width as i64 - size as i64 - margin;
            for (logo, x) in [(client_logo, margin), (user_logo, right_x)] {
                layers.push(VisualLayer {
                    content: LayerContent::Image {
                        path: logo.clone(),
                        width: Some(size),
                        height: Some(size),
                    },
                    start: main_start,
                    duration: inputs.narration_duration,
                    position: Position::Pixels { x, y: margin },
                });
            }
        }

        // 5. Captions, re-based by the full intro offset.
        layers.extend(rebase_captions(
            &inputs.captions,
            intro.intro_duration(),
            total,
            cfg,
        ));

        // 6. User overlays on top of everything, truncated (possibly to
        // zero length) rather than rejected.
        for item in &inputs.overlays {
            let start = item.start_time.max(0.0).min(total);
            let duration = item.duration.max(0.0).min(total - start);
            layers.push(VisualLayer {
                content: LayerContent::Text {
                    text: item.text.clone(),
                    style: item.style(&cfg.font),
                    max_width: cfg.width.saturating_sub(cfg.overlay_inset),
                },
                start,
                duration,
                position: Position::Center,
            });
        }

        // Audio: narration begins exactly when the disclaimer ends, so
        // compliance content is never talked over; it plays under the
        // bumper. Music spans the whole composite at low gain.
        let mut audio = vec![AudioTrack::new(
            inputs.narration_path.clone(),
            inputs.narration_duration,
        )
        .with_start(intro.disclaimer_duration)];

        if let Some(music) = &inputs.music {
            audio.push(
                AudioTrack::new(music.path.clone(), music.duration.min(total))
                    .with_gain(cfg.music_gain),
            );
        }

        let plan = CompositePlan {
            layers,
            audio,
            total_duration: total,
            width: cfg.width,
            height: cfg.height,
        };

        plan.validate()?;

        info!(
            layers = plan.layers.len(),
            audio = plan.audio.len(),
            total_duration = plan.total_duration,
            "Composite plan resolved"
        );
        Ok(plan)
    }

    fn push_bumper_layers(
        &self,
        layers: &mut Vec<VisualLayer>,
        inputs: &CompositionInputs,
        intro: &IntroPlan,
        client_logo: &PathBuf,
        user_logo: &PathBuf,
    ) {
        let cfg = &self.config;
        let bumper_start = intro.offset(IntroStage::Bumper);

        // Backdrop: the leading background slice, muted. A short or
        // missing background leaves flat color under the logos instead.
        if let Some(bg) = inputs.background.as_ref().filter(|_| intro.background_consumed > 0.0) {
            layers.push(VisualLayer {
                content: LayerContent::Video {
                    path: bg.path.clone(),
                    source_start: 0.0,
                },
                start: bumper_start,
                duration: intro.background_consumed,
                position: Position::Center,
            });
        }
        if intro.background_consumed < intro.bumper_duration {
            layers.push(VisualLayer {
                content: LayerContent::Color {
                    rgb: cfg.filler_color,
                },
                start: bumper_start + intro.background_consumed,
                duration: intro.bumper_duration - intro.background_consumed,
                position: Position::Center,
            });
        }

        let logo_width = cfg.bumper_logo_width();
        let half = cfg.bumper_logo_duration();
        for (i, logo) in [client_logo, user_logo].into_iter().enumerate() {
            layers.push(VisualLayer {
                content: LayerContent::Image {
                    path: logo.clone(),
                    width: Some(logo_width),
                    height: None,
                },
                start: bumper_start + half * i as f64,
                duration: half,
                position: Position::Center,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_asset(duration: f64) -> MediaAsset {
        MediaAsset {
            source: "bg".to_string(),
            path: "/tmp/bg.mp4".into(),
            duration,
            width: 1920,
            height: 1080,
        }
    }

    fn audio_asset(duration: f64) -> MediaAsset {
        MediaAsset {
            source: "bgm".to_string(),
            path: "/tmp/bgm.mp3".into(),
            duration,
            width: 0,
            height: 0,
        }
    }

    fn base_inputs(narration_duration: f64) -> CompositionInputs {
        CompositionInputs {
            background: Some(video_asset(60.0)),
            disclaimer: None,
            client_logo: None,
            user_logo: None,
            narration_path: "/tmp/voice.mp3".into(),
            narration_duration,
            music: Some(audio_asset(120.0)),
            captions: Vec::new(),
            overlays: Vec::new(),
        }
    }

    fn engine() -> CompositionEngine {
        CompositionEngine::new(EngineConfig::default())
    }

    #[test]
    fn test_minimal_scenario_hello_world() {
        // Narration 2.0s, no disclaimer, no logos, no overlays
        let inputs = base_inputs(2.0);
        let plan = engine().compose(&inputs).unwrap();

        assert_eq!(plan.total_duration, 2.0);
        assert_eq!(plan.layers.len(), 1);
        let bg = &plan.layers[0];
        assert_eq!(bg.start, 0.0);
        assert_eq!(bg.duration, 2.0);
        assert!(matches!(
            bg.content,
            LayerContent::Video { source_start, .. } if source_start == 0.0
        ));

        assert_eq!(plan.audio.len(), 2);
        let narration = &plan.audio[0];
        assert_eq!(narration.start, 0.0);
        assert_eq!(narration.duration, 2.0);
        assert_eq!(narration.gain, 1.0);
        let music = &plan.audio[1];
        assert_eq!(music.start, 0.0);
        assert_eq!(music.duration, 2.0);
        assert_eq!(music.gain, 0.1);
    }

    #[test]
    fn test_full_intro_scenario() {
        // Disclaimer 3.0 + bumper 4.0 + narration 10.0 -> total 17.0
        let mut inputs = base_inputs(10.0);
        inputs.disclaimer = Some(MediaAsset {
            source: "disc".to_string(),
            path: "/tmp/disc.mp4".into(),
            duration: 8.0,
            width: 1920,
            height: 1080,
        });
        inputs.client_logo = Some("/tmp/client.png".into());
        inputs.user_logo = Some("/tmp/user.png".into());

        let plan = engine().compose(&inputs).unwrap();
        assert_eq!(plan.total_duration, 17.0);

        // Main background window starts at intro end, after the consumed slice
        let main = plan
            .layers
            .iter()
            .find(|l| {
                matches!(l.content, LayerContent::Video { source_start, .. } if source_start == 4.0)
            })
            .expect("main background window");
        assert_eq!(main.start, 7.0);
        assert_eq!(main.duration, 10.0);

        // Corner logos span the full main window
        let corners: Vec<_> = plan
            .layers
            .iter()
            .filter(|l| matches!(l.position, Position::Pixels { .. }))
            .collect();
        assert_eq!(corners.len(), 2);
        for corner in &corners {
            assert_eq!(corner.start, 7.0);
            assert_eq!(corner.duration, 10.0);
        }
        assert_eq!(
            corners[0].position,
            Position::Pixels { x: 30, y: 30 }
        );
        assert_eq!(
            corners[1].position,
            Position::Pixels { x: 1920 - 180 - 30, y: 30 }
        );

        // Bumper logos: half the window each, back to back
        let bumper_logos: Vec<_> = plan
            .layers
            .iter()
            .filter(|l| {
                matches!(&l.content, LayerContent::Image { width: Some(960), .. })
            })
            .collect();
        assert_eq!(bumper_logos.len(), 2);
        assert_eq!(bumper_logos[0].start, 3.0);
        assert_eq!(bumper_logos[0].duration, 2.0);
        assert_eq!(bumper_logos[1].start, 5.0);

        // Narration starts when the disclaimer ends, not after the bumper
        assert_eq!(plan.audio[0].start, 3.0);
        assert_eq!(plan.audio[0].end(), 13.0);
        // Music underlies the entire composite
        assert_eq!(plan.audio[1].start, 0.0);
        assert_eq!(plan.audio[1].duration, 17.0);

        plan.validate().unwrap();
    }

    #[test]
    fn test_single_logo_means_no_bumper_and_no_corners() {
        let mut inputs = base_inputs(5.0);
        inputs.client_logo = Some("/tmp/client.png".into());

        let plan = engine().compose(&inputs).unwrap();
        assert_eq!(plan.total_duration, 5.0);
        assert!(plan
            .layers
            .iter()
            .all(|l| !matches!(l.content, LayerContent::Image { .. })));
    }

    #[test]
    fn test_missing_background_substitutes_color() {
        let mut inputs = base_inputs(6.0);
        inputs.background = None;

        let plan = engine().compose(&inputs).unwrap();
        let filler = &plan.layers[0];
        assert!(matches!(filler.content, LayerContent::Color { .. }));
        assert_eq!(filler.start, 0.0);
        assert_eq!(filler.duration, 6.0);
    }

    #[test]
    fn test_short_background_substitutes_color() {
        let mut inputs = base_inputs(30.0);
        inputs.background = Some(video_asset(10.0));

        let plan = engine().compose(&inputs).unwrap();
        let filler = plan
            .layers
            .iter()
            .find(|l| matches!(l.content, LayerContent::Color { .. }))
            .expect("color filler");
        assert_eq!(filler.duration, 30.0);
    }

    #[test]
    fn test_background_not_reused_after_bumper_slice() {
        let mut inputs = base_inputs(10.0);
        inputs.client_logo = Some("/tmp/client.png".into());
        inputs.user_logo = Some("/tmp/user.png".into());

        let plan = engine().compose(&inputs).unwrap();

        let backdrop = plan
            .layers
            .iter()
            .find(|l| {
                matches!(l.content, LayerContent::Video { source_start, .. } if source_start == 0.0)
            })
            .expect("bumper backdrop");
        assert_eq!(backdrop.duration, 4.0);

        let main = plan
            .layers
            .iter()
            .find(|l| {
                matches!(l.content, LayerContent::Video { source_start, .. } if source_start > 0.0)
            })
            .expect("main window");
        match main.content {
            LayerContent::Video { source_start, .. } => assert_eq!(source_start, 4.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_captions_rebased_by_intro_duration() {
        let mut inputs = base_inputs(10.0);
        inputs.disclaimer = Some(MediaAsset {
            source: "disc".to_string(),
            path: "/tmp/disc.mp4".into(),
            duration: 8.0,
            width: 1920,
            height: 1080,
        });
        inputs.client_logo = Some("/tmp/a.png".into());
        inputs.user_logo = Some("/tmp/b.png".into());
        inputs.captions = vec![
            CaptionSegment {
                text: "first".to_string(),
                start: 0.0,
                end: 2.0,
            },
            CaptionSegment {
                text: "second".to_string(),
                start: 2.0,
                end: 4.5,
            },
        ];

        let plan = engine().compose(&inputs).unwrap();
        let captions: Vec<_> = plan
            .layers
            .iter()
            .filter(|l| matches!(l.position, Position::BottomCenter { .. }))
            .collect();
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].start, 7.0);
        assert_eq!(captions[1].start, 9.0);
        assert!(captions[0].end() <= captions[1].start);
    }

    #[test]
    fn test_overlay_past_total_truncates_to_zero() {
        let mut inputs = base_inputs(10.0);
        inputs.disclaimer = Some(MediaAsset {
            source: "disc".to_string(),
            path: "/tmp/disc.mp4".into(),
            duration: 8.0,
            width: 1920,
            height: 1080,
        });
        inputs.client_logo = Some("/tmp/a.png".into());
        inputs.user_logo = Some("/tmp/b.png".into());
        inputs.overlays = vec![TextOverlayItem {
            text: "Sale".to_string(),
            start_time: 20.0,
            duration: 3.0,
            font_size: 100,
            color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 3,
        }];

        let plan = engine().compose(&inputs).unwrap();
        let overlay = plan.layers.last().unwrap();
        assert_eq!(overlay.start, 17.0);
        assert_eq!(overlay.duration, 0.0);
        plan.validate().unwrap();
    }

    #[test]
    fn test_overlay_straddling_end_truncated() {
        let mut inputs = base_inputs(10.0);
        inputs.overlays = vec![TextOverlayItem {
            text: "Ending".to_string(),
            start_time: 9.0,
            duration: 3.0,
            font_size: 100,
            color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 3,
        }];

        let plan = engine().compose(&inputs).unwrap();
        let overlay = plan.layers.last().unwrap();
        assert_eq!(overlay.start, 9.0);
        assert_eq!(overlay.duration, 1.0);
    }

    #[test]
    fn test_overlays_paint_above_captions() {
        let mut inputs = base_inputs(10.0);
        inputs.captions = vec![CaptionSegment {
            text: "caption".to_string(),
            start: 0.0,
            end: 2.0,
        }];
        inputs.overlays = vec![TextOverlayItem {
            text: "overlay".to_string(),
            start_time: 0.0,
            duration: 2.0,
            font_size: 100,
            color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 3,
        }];

        let plan = engine().compose(&inputs).unwrap();
        let caption_idx = plan
            .layers
            .iter()
            .position(|l| matches!(l.position, Position::BottomCenter { .. }))
            .unwrap();
        // Overlays are appended last: highest z-order
        assert_eq!(plan.layers.len() - 1, caption_idx + 1);
    }

    #[test]
    fn test_music_clamped_to_source_duration() {
        let mut inputs = base_inputs(30.0);
        inputs.music = Some(audio_asset(12.0));

        let plan = engine().compose(&inputs).unwrap();
        let music = &plan.audio[1];
        assert_eq!(music.duration, 12.0);
    }

    #[test]
    fn test_missing_music_omitted() {
        let mut inputs = base_inputs(5.0);
        inputs.music = None;

        let plan = engine().compose(&inputs).unwrap();
        assert_eq!(plan.audio.len(), 1);
    }

    #[test]
    fn test_zero_narration_is_fatal() {
        let inputs = base_inputs(0.0);
        assert!(matches!(
            engine().compose(&inputs),
            Err(ComposeError::InvalidNarration(_))
        ));
    }

    #[test]
    fn test_every_window_within_total() {
        let mut inputs = base_inputs(10.0);
        inputs.disclaimer = Some(MediaAsset {
            source: "disc".to_string(),
            path: "/tmp/disc.mp4".into(),
            duration: 2.0,
            width: 1920,
            height: 1080,
        });
        inputs.client_logo = Some("/tmp/a.png".into());
        inputs.user_logo = Some("/tmp/b.png".into());
        inputs.captions = vec![CaptionSegment {
            text: "x".to_string(),
            start: 8.0,
            end: 10.5,
        }];

        let plan = engine().compose(&inputs).unwrap();
        for layer in &plan.layers {
            assert!(layer.end() <= plan.total_duration + TIME_EPSILON);
        }
        for track in &plan.audio {
            assert!(track.end() <= plan.total_duration + TIME_EPSILON);
        }
    }
}
