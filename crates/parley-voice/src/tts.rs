use crate::config::SynthesisConfig;
use crate::error::{Stage, VoiceError};
use crate::gateway::{GatewayFuture, SpeechSynthesizer};
use crate::http::{build_client, decode_json};
use crate::prompt::truncate_chars;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateSpeechRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateSpeechResponse {
    #[serde(default)]
    audio_file: Option<String>,
}

/// Text-to-speech through the Murf speech generation API.
#[derive(Debug, Clone)]
pub struct TtsService {
    client: reqwest::Client,
    config: SynthesisConfig,
}

impl TtsService {
    pub fn new(config: SynthesisConfig) -> Result<Self, VoiceError> {
        let client = build_client(Stage::Synthesis, config.timeout())?;
        Ok(Self { client, config })
    }

    /// Returns whether an API key was configured.
    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    /// Synthesizes `text` and returns the URL of the hosted audio file.
    ///
    /// Text longer than `max_chars` characters is cut to its first `max_chars`
    /// characters before it is sent; this is lossy, not an error.
    pub async fn synthesize(&self, text: &str) -> Result<String, VoiceError> {
        if !self.is_enabled() {
            return Err(VoiceError::Config(
                "speech synthesis API key is not configured (set MURF_API_KEY)".to_string(),
            ));
        }

        let trimmed = truncate_chars(text, self.config.max_chars);
        if trimmed.len() < text.len() {
            debug!(
                original_chars = text.chars().count(),
                max_chars = self.config.max_chars,
                "truncating synthesis input"
            );
        }

        let request_body = GenerateSpeechRequest {
            text: trimmed,
            voice_id: &self.config.voice_id,
            format: &self.config.format,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                VoiceError::from_transport(Stage::Synthesis, self.config.timeout_seconds, e)
            })?;

        let parsed: GenerateSpeechResponse =
            decode_json(Stage::Synthesis, self.config.timeout_seconds, response).await?;

        match parsed.audio_file {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(VoiceError::Synthesis(
                "response did not include an audio file URL".to_string(),
            )),
        }
    }
}

impl SpeechSynthesizer for TtsService {
    fn synthesize<'a>(&'a self, text: &'a str) -> GatewayFuture<'a, String> {
        Box::pin(TtsService::synthesize(self, text))
    }
}
