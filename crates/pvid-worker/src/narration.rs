//! Narration track building.
//!
//! Runs the synthesis backend chain, persists the audio into the request
//! workspace, and probes its duration once. That duration drives every
//! other duration decision in the pipeline and is never re-derived.

use std::path::{Path, PathBuf};

use tracing::info;

use pvid_media::probe_media;
use pvid_speech::{synthesize, SynthesisBackend};

use crate::error::{WorkerError, WorkerResult};

/// The narration track: local audio file plus its authoritative duration.
#[derive(Debug, Clone)]
pub struct NarrationTrack {
    pub path: PathBuf,
    pub duration: f64,
}

/// Synthesize narration and resolve its duration.
pub async fn build_narration(
    text: &str,
    backends: &[Box<dyn SynthesisBackend>],
    workdir: impl AsRef<Path>,
) -> WorkerResult<NarrationTrack> {
    let audio = synthesize(text, backends)
        .await
        .map_err(WorkerError::synthesis_failed)?;

    let path = workdir
        .as_ref()
        .join(format!("narration.{}", audio.extension));
    tokio::fs::write(&path, &audio.bytes).await?;

    let info = probe_media(&path)
        .await
        .map_err(WorkerError::synthesis_failed)?;

    info!(
        backend = audio.backend,
        duration = info.duration,
        "Narration track ready"
    );

    Ok(NarrationTrack {
        path,
        duration: info.duration,
    })
}
