//! The per-request video generation pipeline.
//!
//! A strictly sequential chain: fetch -> synthesize -> transcribe ->
//! compose -> render -> publish. Fetches for independent assets run
//! concurrently since they have no data dependency; everything else gates
//! on the narration duration. Each request owns a scoped temp workspace
//! that is released on every exit path.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use pvid_compose::{CompositionEngine, CompositionInputs};
use pvid_media::{fetch_logo, render_plan, resolve_asset, FfmpegRunner};
use pvid_models::{CaptionSegment, MediaAsset, VideoArtifact, VideoRequest};
use pvid_speech::{default_backends, transcribe_audio, SynthesisBackend, TranscriberConfig};
use pvid_storage::S3Client;

use crate::config::PipelineConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::narration::build_narration;

/// Video generation pipeline.
///
/// One pipeline serves many requests; independent requests may render
/// concurrently up to the configured limit.
pub struct VideoPipeline {
    config: PipelineConfig,
    engine: CompositionEngine,
    backends: Vec<Box<dyn SynthesisBackend>>,
    render_slots: Arc<Semaphore>,
}

impl VideoPipeline {
    /// Create a pipeline from configuration.
    pub fn new(config: PipelineConfig) -> WorkerResult<Self> {
        let backends = default_backends(
            config.elevenlabs_api_key.as_deref(),
            config.elevenlabs_voice_id.as_deref(),
        )
        .map_err(|e| WorkerError::config_error(e.to_string()))?;

        let engine = CompositionEngine::new(config.engine.clone());
        let render_slots = Arc::new(Semaphore::new(config.max_concurrent_renders));

        Ok(Self {
            config,
            engine,
            backends,
            render_slots,
        })
    }

    /// Process a request to completion.
    pub async fn process(&self, request: &VideoRequest) -> WorkerResult<VideoArtifact> {
        let (_tx, rx) = watch::channel(false);
        self.process_with_cancel(request, rx).await
    }

    /// Process a request with a cancellation signal.
    ///
    /// Cancellation releases the request's temp workspace without
    /// affecting other in-flight requests.
    pub async fn process_with_cancel(
        &self,
        request: &VideoRequest,
        cancel_rx: watch::Receiver<bool>,
    ) -> WorkerResult<VideoArtifact> {
        let request_id = Uuid::new_v4();
        let span = info_span!("request", id = %request_id, output = %request.output_name);
        self.run_pipeline(request, cancel_rx).instrument(span).await
    }

    async fn run_pipeline(
        &self,
        request: &VideoRequest,
        cancel_rx: watch::Receiver<bool>,
    ) -> WorkerResult<VideoArtifact> {
        // Input validation happens before any resource is consumed.
        validate_request(request)?;

        info!("Starting video generation");

        // Request-scoped workspace; dropped (and deleted) on every exit.
        let workspace = tempfile::tempdir()?;
        let workdir = workspace.path();

        // Independent asset fetches run concurrently.
        let template_ref = request
            .template_video
            .clone()
            .or_else(|| self.config.default_template_video.clone());
        let bgm_ref = request
            .background_music
            .clone()
            .or_else(|| self.config.default_bgm.clone());
        let disclaimer_ref = request
            .disclaimer_video
            .clone()
            .or_else(|| self.config.default_disclaimer_video.clone());
        let logo_refs = paired_logo_refs(request);

        let (background, music, disclaimer, logos) = tokio::try_join!(
            resolve_optional(template_ref.as_deref(), workdir, "mp4"),
            resolve_optional(bgm_ref.as_deref(), workdir, "mp3"),
            resolve_optional(disclaimer_ref.as_deref(), workdir, "mp4"),
            fetch_logo_pair(logo_refs, workdir),
        )?;

        check_cancelled(&cancel_rx)?;

        // Narration: the authoritative clock for everything downstream.
        let narration =
            build_narration(request.narration_text.trim(), &self.backends, workdir).await?;

        check_cancelled(&cancel_rx)?;

        // Caption timing must match what the viewer hears; a failed
        // transcription aborts the request rather than shipping a
        // caption-less video.
        let transcriber = TranscriberConfig {
            model_size: self.config.whisper_model_size.clone(),
            timeout: self.config.transcribe_timeout,
        };
        let captions = derive_captions(&narration.path, workdir, &transcriber).await?;

        let mut engine_config = self.engine.config().clone();
        if let Some(font) = &request.font {
            engine_config.font = font.clone();
        }
        let engine = CompositionEngine::new(engine_config);

        let (client_logo, user_logo) = match logos {
            Some((client, user)) => (Some(client), Some(user)),
            None => (None, None),
        };

        let inputs = CompositionInputs {
            background,
            disclaimer,
            client_logo,
            user_logo,
            narration_path: narration.path.clone(),
            narration_duration: narration.duration,
            music,
            captions,
            overlays: request.text_overlays.clone(),
        };

        let plan = engine.compose(&inputs)?;

        check_cancelled(&cancel_rx)?;

        // Render under a concurrency permit so orchestration stays
        // responsive while encodes saturate the CPU.
        let output_path = self.output_path(&request.output_name).await?;
        {
            let _permit = self
                .render_slots
                .acquire()
                .await
                .map_err(WorkerError::render_failed)?;

            let runner = FfmpegRunner::new()
                .with_timeout(self.config.render_timeout.as_secs())
                .with_cancel(cancel_rx.clone());

            render_plan(&plan, &self.config.encoding, &output_path, &runner)
                .await
                .map_err(WorkerError::render_failed)?;
        }

        info!(path = %output_path.display(), "Video rendered");

        if request.publish {
            match self.publish(&output_path, &request.output_name).await {
                Ok(url) => {
                    info!(url = %url, "Video published");
                    return Ok(VideoArtifact::Published { url });
                }
                Err(e) => {
                    warn!("Publish failed, returning local artifact: {}", e);
                }
            }
        }

        Ok(VideoArtifact::Local { path: output_path })
    }

    async fn output_path(&self, output_name: &str) -> WorkerResult<PathBuf> {
        let dir = PathBuf::from(&self.config.output_dir);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir.join(output_name))
    }

    async fn publish(&self, path: &PathBuf, key: &str) -> WorkerResult<String> {
        let client = S3Client::from_env()
            .await
            .map_err(WorkerError::publish_failed)?;
        client
            .publish(path, key)
            .await
            .map_err(WorkerError::publish_failed)
    }
}

/// Reject invalid requests before any resource is consumed.
fn validate_request(request: &VideoRequest) -> WorkerResult<()> {
    if request.narration_text.trim().is_empty() {
        return Err(WorkerError::invalid_input("narration_text cannot be empty"));
    }
    if request.output_name.trim().is_empty() {
        return Err(WorkerError::invalid_input("output_name cannot be empty"));
    }
    Ok(())
}

/// The logo pair is all-or-nothing: one side alone contributes nothing.
fn paired_logo_refs(request: &VideoRequest) -> Option<(String, String)> {
    match (&request.client_logo_url, &request.user_logo_url) {
        (Some(client), Some(user)) => Some((client.clone(), user.clone())),
        (Some(_), None) | (None, Some(_)) => {
            warn!("Only one logo supplied; skipping logo bumper and corner logos");
            None
        }
        (None, None) => None,
    }
}

/// Transcribe the narration track into caption segments.
///
/// Any transcription failure is fatal to the request; captions are part
/// of the product, not best-effort decoration.
async fn derive_captions(
    narration: &std::path::Path,
    workdir: &std::path::Path,
    transcriber: &TranscriberConfig,
) -> WorkerResult<Vec<CaptionSegment>> {
    transcribe_audio(narration, workdir, transcriber)
        .await
        .map_err(WorkerError::transcription_failed)
}

async fn resolve_optional(
    reference: Option<&str>,
    workdir: &std::path::Path,
    ext: &str,
) -> WorkerResult<Option<MediaAsset>> {
    match reference {
        Some(r) => resolve_asset(r, workdir, ext)
            .await
            .map(Some)
            .map_err(WorkerError::fetch_failed),
        None => Ok(None),
    }
}

async fn fetch_logo_pair(
    refs: Option<(String, String)>,
    workdir: &std::path::Path,
) -> WorkerResult<Option<(PathBuf, PathBuf)>> {
    match refs {
        Some((client, user)) => {
            let (client_path, user_path) =
                tokio::try_join!(fetch_logo(&client, workdir), fetch_logo(&user, workdir))
                    .map_err(WorkerError::fetch_failed)?;
            Ok(Some((client_path, user_path)))
        }
        None => Ok(None),
    }
}

fn check_cancelled(cancel_rx: &watch::Receiver<bool>) -> WorkerResult<()> {
    if *cancel_rx.borrow() {
        Err(WorkerError::Cancelled)
    } else {
        Ok(())
    }
}
