//! Provider configuration for the three gateways.
//!
//! Everything except the API key can come from the config file. Keys are
//! never deserialized or serialized and are redacted from `Debug` output;
//! the server fills them in from the environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Provider-imposed limit on synthesis input, in characters.
pub const DEFAULT_SYNTHESIS_MAX_CHARS: usize = 3000;

fn default_assemblyai_base_url() -> String {
    "https://api.assemblyai.com".to_string()
}

fn default_transcription_timeout_seconds() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_reply_timeout_seconds() -> u64 {
    60
}

fn default_murf_endpoint() -> String {
    "https://api.murf.ai/v1/speech/generate".to_string()
}

fn default_voice_id() -> String {
    "en-US-natalie".to_string()
}

fn default_audio_format() -> String {
    "MP3".to_string()
}

fn default_max_chars() -> usize {
    DEFAULT_SYNTHESIS_MAX_CHARS
}

fn default_synthesis_timeout_seconds() -> u64 {
    60
}

/// AssemblyAI speech-to-text settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "default_assemblyai_base_url")]
    pub base_url: String,
    #[serde(skip)]
    pub api_key: String,
    /// Upper bound for the whole upload/submit/poll exchange.
    #[serde(default = "default_transcription_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Delay between transcript status polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: default_assemblyai_base_url(),
            api_key: String::new(),
            timeout_seconds: default_transcription_timeout_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl fmt::Debug for TranscriptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_seconds", &self.timeout_seconds)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .finish()
    }
}

impl TranscriptionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Gemini language-model settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(skip)]
    pub api_key: String,
    /// Model identifier, fixed for the life of the process.
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_reply_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            api_key: String::new(),
            model: default_gemini_model(),
            timeout_seconds: default_reply_timeout_seconds(),
        }
    }
}

impl fmt::Debug for ReplyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl ReplyConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Murf text-to-speech settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_murf_endpoint")]
    pub endpoint: String,
    /// May be empty: synthesis then fails per request instead of at startup.
    #[serde(skip)]
    pub api_key: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_audio_format")]
    pub format: String,
    /// Input longer than this many characters is truncated before sending.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_synthesis_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_murf_endpoint(),
            api_key: String::new(),
            voice_id: default_voice_id(),
            format: default_audio_format(),
            max_chars: default_max_chars(),
            timeout_seconds: default_synthesis_timeout_seconds(),
        }
    }
}

impl fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("voice_id", &self.voice_id)
            .field("format", &self.format)
            .field("max_chars", &self.max_chars)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl SynthesisConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
