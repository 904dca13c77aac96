//! Text-to-speech backend chain.
//!
//! Backends share a uniform `attempt` contract and are tried in order; the
//! chain stops at the first success. A non-final backend's failure is
//! logged and swallowed, never surfaced to the caller.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{SpeechError, SpeechResult};

/// Default ElevenLabs API base URL.
pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
/// Default ElevenLabs voice.
pub const DEFAULT_VOICE_ID: &str = "2EiwWnXFnvU5JabPnv8n";
/// TTS model used for narration.
const ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";
/// Requested encoding for synthesized audio.
const ELEVENLABS_OUTPUT_FORMAT: &str = "mp3_44100_128";
/// HTTP request ceiling for the synthesis call.
const SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(60);

/// Synthesized narration audio.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// Encoded audio bytes
    pub bytes: Vec<u8>,
    /// File extension for the encoding ("mp3", "wav")
    pub extension: &'static str,
    /// Name of the backend that produced the audio
    pub backend: &'static str,
}

/// A text-to-speech backend.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// File extension of the audio this backend produces.
    fn extension(&self) -> &'static str;

    /// Attempt synthesis. Any failure here lets the chain fall through to
    /// the next backend.
    async fn attempt(&self, text: &str) -> SpeechResult<Vec<u8>>;
}

/// Walk the backend chain, returning the first successful synthesis.
pub async fn synthesize(
    text: &str,
    backends: &[Box<dyn SynthesisBackend>],
) -> SpeechResult<SynthesizedAudio> {
    let mut last_error = None;

    for backend in backends {
        match backend.attempt(text).await {
            Ok(bytes) => {
                info!("Voiceover generated by {}", backend.name());
                return Ok(SynthesizedAudio {
                    bytes,
                    extension: backend.extension(),
                    backend: backend.name(),
                });
            }
            Err(e) => {
                warn!("Synthesis backend {} failed: {}", backend.name(), e);
                last_error = Some(e);
            }
        }
    }

    Err(SpeechError::SynthesisUnavailable(
        last_error.map_or_else(|| "no backends configured".to_string(), |e| e.to_string()),
    ))
}

/// ElevenLabs configuration.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub base_url: String,
}

impl ElevenLabsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            base_url: ELEVENLABS_BASE_URL.to_string(),
        }
    }

    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Commercial TTS over the ElevenLabs HTTP API.
pub struct ElevenLabsBackend {
    config: ElevenLabsConfig,
    client: reqwest::Client,
}

impl ElevenLabsBackend {
    pub fn new(config: ElevenLabsConfig) -> SpeechResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(SYNTHESIS_TIMEOUT)
            .build()
            .map_err(|e| SpeechError::backend_failed("elevenlabs", e.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl SynthesisBackend for ElevenLabsBackend {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn extension(&self) -> &'static str {
        "mp3"
    }

    async fn attempt(&self, text: &str) -> SpeechResult<Vec<u8>> {
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.config.base_url, self.config.voice_id, ELEVENLABS_OUTPUT_FORMAT
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .json(&TtsRequest {
                text,
                model_id: ELEVENLABS_MODEL,
            })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SpeechError::backend_failed("elevenlabs", e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::backend_failed("elevenlabs", e.to_string()))?;

        if bytes.is_empty() {
            return Err(SpeechError::backend_failed(
                "elevenlabs",
                "empty audio response",
            ));
        }

        Ok(bytes.to_vec())
    }
}

/// Offline fallback using the local espeak binary.
pub struct EspeakBackend;

#[async_trait]
impl SynthesisBackend for EspeakBackend {
    fn name(&self) -> &'static str {
        "espeak"
    }

    fn extension(&self) -> &'static str {
        "wav"
    }

    async fn attempt(&self, text: &str) -> SpeechResult<Vec<u8>> {
        which::which("espeak").map_err(|_| SpeechError::EspeakNotFound)?;

        let dir = tempfile::tempdir()?;
        let wav_path = dir.path().join("narration.wav");

        let output = Command::new("espeak")
            .arg("-w")
            .arg(&wav_path)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpeechError::backend_failed(
                "espeak",
                stderr.trim().to_string(),
            ));
        }

        read_wav(&wav_path).await
    }
}

async fn read_wav(path: &Path) -> SpeechResult<Vec<u8>> {
    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(SpeechError::backend_failed("espeak", "empty wav output"));
    }
    Ok(bytes)
}

/// Build the default backend chain from an optional API key.
///
/// Without credentials the commercial backend is skipped entirely, so a
/// missing key degrades at request time rather than failing startup.
pub fn default_backends(
    api_key: Option<&str>,
    voice_id: Option<&str>,
) -> SpeechResult<Vec<Box<dyn SynthesisBackend>>> {
    let mut backends: Vec<Box<dyn SynthesisBackend>> = Vec::new();

    if let Some(key) = api_key.filter(|k| !k.is_empty()) {
        let mut config = ElevenLabsConfig::new(key);
        if let Some(voice) = voice_id.filter(|v| !v.is_empty()) {
            config = config.with_voice(voice);
        }
        backends.push(Box::new(ElevenLabsBackend::new(config)?));
    } else {
        warn!("ELEVENLABS_API_KEY not set, narration will use the espeak fallback");
    }

    backends.push(Box::new(EspeakBackend));
    Ok(backends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedBackend {
        name: &'static str,
        result: Result<Vec<u8>, &'static str>,
        calls: AtomicUsize,
    }

    impl FixedBackend {
        fn ok(name: &'static str, bytes: &[u8]) -> Self {
            Self {
                name,
                result: Ok(bytes.to_vec()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                name,
                result: Err("boom"),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SynthesisBackend for FixedBackend {
        fn name(&self) -> &'static str {
            self.name
        }
        fn extension(&self) -> &'static str {
            "mp3"
        }
        async fn attempt(&self, _text: &str) -> SpeechResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(bytes) => Ok(bytes.clone()),
                Err(msg) => Err(SpeechError::backend_failed(self.name, *msg)),
            }
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let backends: Vec<Box<dyn SynthesisBackend>> = vec![
            Box::new(FixedBackend::ok("primary", b"audio")),
            Box::new(FixedBackend::failing("secondary")),
        ];
        let audio = synthesize("hello", &backends).await.unwrap();
        assert_eq!(audio.backend, "primary");
        assert_eq!(audio.bytes, b"audio");
    }

    #[tokio::test]
    async fn test_falls_back_only_on_primary_failure() {
        let backends: Vec<Box<dyn SynthesisBackend>> = vec![
            Box::new(FixedBackend::failing("primary")),
            Box::new(FixedBackend::ok("secondary", b"fallback")),
        ];
        let audio = synthesize("hello", &backends).await.unwrap();
        assert_eq!(audio.backend, "secondary");
    }

    #[tokio::test]
    async fn test_all_backends_failing_reports_single_cause() {
        let backends: Vec<Box<dyn SynthesisBackend>> = vec![
            Box::new(FixedBackend::failing("primary")),
            Box::new(FixedBackend::failing("secondary")),
        ];
        let err = synthesize("hello", &backends).await.unwrap_err();
        assert!(matches!(err, SpeechError::SynthesisUnavailable(_)));
    }

    #[tokio::test]
    async fn test_elevenlabs_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1/text-to-speech/voice-1$"))
            .and(header("xi-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3data".to_vec()))
            .mount(&server)
            .await;

        let backend = ElevenLabsBackend::new(
            ElevenLabsConfig::new("secret")
                .with_voice("voice-1")
                .with_base_url(server.uri()),
        )
        .unwrap();

        let bytes = backend.attempt("Hello world").await.unwrap();
        assert_eq!(bytes, b"mp3data");
    }

    #[tokio::test]
    async fn test_elevenlabs_http_error_is_backend_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let backend = ElevenLabsBackend::new(
            ElevenLabsConfig::new("bad-key").with_base_url(server.uri()),
        )
        .unwrap();

        let err = backend.attempt("Hello").await.unwrap_err();
        assert!(matches!(err, SpeechError::BackendFailed { .. }));
    }

    #[test]
    fn test_default_backends_without_key_skip_primary() {
        let backends = default_backends(None, None).unwrap();
        assert_eq!(backends.len(), 1);
        assert_eq!(backends[0].name(), "espeak");
    }

    #[test]
    fn test_default_backends_with_key() {
        let backends = default_backends(Some("key"), Some("voice")).unwrap();
        assert_eq!(backends.len(), 2);
        assert_eq!(backends[0].name(), "elevenlabs");
        assert_eq!(backends[1].name(), "espeak");
    }
}
