//! Narration transcription via the Whisper CLI.
//!
//! Runs Whisper on the exact audio file used for the narration track so
//! segment timings line up with what the viewer hears, and parses the JSON
//! output into ordered caption segments.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info, warn};

use pvid_models::CaptionSegment;

use crate::error::{SpeechError, SpeechResult};

/// Transcriber configuration.
#[derive(Debug, Clone)]
pub struct TranscriberConfig {
    /// Whisper model size ("tiny", "small", "medium", ...)
    pub model_size: String,
    /// Ceiling for the whole transcription run
    pub timeout: Duration,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            model_size: "small".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    text: String,
    start: f64,
    end: f64,
}

/// Transcribe an audio file into ordered caption segments.
///
/// Segment timings are relative to the audio's own t=0. Degenerate
/// segments (`end <= start`) are dropped.
pub async fn transcribe_audio(
    audio: impl AsRef<Path>,
    workdir: impl AsRef<Path>,
    config: &TranscriberConfig,
) -> SpeechResult<Vec<CaptionSegment>> {
    let audio = audio.as_ref();
    let workdir = workdir.as_ref();

    which::which("whisper").map_err(|_| SpeechError::WhisperNotFound)?;

    info!(
        "Transcribing {} with Whisper model '{}'",
        audio.display(),
        config.model_size
    );

    let run = Command::new("whisper")
        .arg(audio)
        .args(["--model", &config.model_size])
        .args(["--output_format", "json"])
        .arg("--output_dir")
        .arg(workdir)
        .args(["--fp16", "False"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output();

    let output = match tokio::time::timeout(config.timeout, run).await {
        Ok(result) => result?,
        Err(_) => return Err(SpeechError::Timeout(config.timeout.as_secs())),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SpeechError::transcription_failed(stderr.trim().to_string()));
    }

    let stem = audio
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| SpeechError::transcription_failed("audio path has no file stem"))?;
    let json_path = workdir.join(format!("{stem}.json"));

    let json = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
        SpeechError::transcription_failed(format!("missing {}: {e}", json_path.display()))
    })?;

    let segments = parse_whisper_json(&json)?;
    debug!("Transcription produced {} segments", segments.len());
    Ok(segments)
}

/// Parse Whisper's JSON output into caption segments, preserving order and
/// dropping degenerate windows.
pub fn parse_whisper_json(json: &str) -> SpeechResult<Vec<CaptionSegment>> {
    let parsed: WhisperOutput = serde_json::from_str(json)?;

    let mut segments = Vec::with_capacity(parsed.segments.len());
    for seg in parsed.segments {
        if seg.end <= seg.start {
            warn!(
                "Dropping degenerate transcription segment [{:.3}, {:.3}): {:?}",
                seg.start, seg.end, seg.text
            );
            continue;
        }
        segments.push(CaptionSegment {
            text: seg.text.trim().to_string(),
            start: seg.start,
            end: seg.end,
        });
    }
    Ok(segments)
}
