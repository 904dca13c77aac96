//! Pipeline configuration.

use std::time::Duration;

use pvid_compose::EngineConfig;
use pvid_models::EncodingConfig;

/// Pipeline configuration, loaded from the environment once at startup
/// and passed explicitly from there on.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Default background/template reference when the request omits one
    pub default_template_video: Option<String>,
    /// Default background music reference
    pub default_bgm: Option<String>,
    /// Default disclaimer reference
    pub default_disclaimer_video: Option<String>,
    /// Directory for rendered output files
    pub output_dir: String,
    /// ElevenLabs API key (absent: espeak fallback only)
    pub elevenlabs_api_key: Option<String>,
    /// ElevenLabs voice id
    pub elevenlabs_voice_id: Option<String>,
    /// Whisper model size
    pub whisper_model_size: String,
    /// Ceiling for a single render
    pub render_timeout: Duration,
    /// Ceiling for transcription
    pub transcribe_timeout: Duration,
    /// Independent requests may render concurrently up to this limit
    pub max_concurrent_renders: usize,
    /// Composition tunables
    pub engine: EngineConfig,
    /// Encode settings
    pub encoding: EncodingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_template_video: None,
            default_bgm: None,
            default_disclaimer_video: None,
            output_dir: "static".to_string(),
            elevenlabs_api_key: None,
            elevenlabs_voice_id: None,
            whisper_model_size: "small".to_string(),
            render_timeout: Duration::from_secs(600),
            transcribe_timeout: Duration::from_secs(600),
            max_concurrent_renders: 2,
            engine: EngineConfig::default(),
            encoding: EncodingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut engine = EngineConfig::default();
        if let Some(width) = env_parse("VIDEO_WIDTH") {
            engine.width = width;
        }
        if let Some(height) = env_parse("VIDEO_HEIGHT") {
            engine.height = height;
        }
        if let Ok(font) = std::env::var("DEFAULT_FONT") {
            engine.font = font;
        }

        let mut encoding = EncodingConfig::default();
        if let Some(fps) = env_parse("VIDEO_FPS") {
            encoding.fps = fps;
        }

        Self {
            default_template_video: std::env::var("DEFAULT_TEMPLATE_VIDEO").ok(),
            default_bgm: std::env::var("DEFAULT_BGM").ok(),
            default_disclaimer_video: std::env::var("DEFAULT_DISCLAIMER_VIDEO").ok(),
            output_dir: std::env::var("VIDEO_OUTPUT_DIR").unwrap_or_else(|_| "static".to_string()),
            elevenlabs_api_key: std::env::var("ELEVENLABS_API_KEY").ok(),
            elevenlabs_voice_id: std::env::var("ELEVENLABS_VOICE_ID").ok(),
            whisper_model_size: std::env::var("WHISPER_MODEL_SIZE")
                .unwrap_or_else(|_| "small".to_string()),
            render_timeout: Duration::from_secs(env_parse("RENDER_TIMEOUT_SECS").unwrap_or(600)),
            transcribe_timeout: Duration::from_secs(
                env_parse("TRANSCRIBE_TIMEOUT_SECS").unwrap_or(600),
            ),
            max_concurrent_renders: env_parse("MAX_CONCURRENT_RENDERS").unwrap_or(2),
            engine,
            encoding,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_dir, "static");
        assert_eq!(config.whisper_model_size, "small");
        assert_eq!(config.max_concurrent_renders, 2);
        assert_eq!(config.engine.width, 1920);
        assert_eq!(config.encoding.fps, 24);
    }
}
