use crate::config::TranscriptionConfig;
use crate::error::{Stage, VoiceError};
use crate::gateway::{GatewayFuture, Transcriber};
use crate::http::{build_client, decode_json};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Speech-to-text through the AssemblyAI REST API.
///
/// A transcription is three exchanges: upload the audio, submit a transcript
/// job for the uploaded file, then poll the job until it completes or fails.
/// The whole exchange is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct SttService {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl SttService {
    pub fn new(config: TranscriptionConfig) -> Result<Self, VoiceError> {
        let client = build_client(Stage::Transcription, config.timeout())?;
        Ok(Self { client, config })
    }

    pub async fn transcribe(&self, audio_data: &[u8]) -> Result<String, VoiceError> {
        tokio::time::timeout(self.config.timeout(), self.run(audio_data))
            .await
            .map_err(|_| VoiceError::Timeout {
                stage: Stage::Transcription,
                seconds: self.config.timeout_seconds,
            })?
    }

    async fn run(&self, audio_data: &[u8]) -> Result<String, VoiceError> {
        let upload_url = self.upload(audio_data).await?;
        let transcript_id = self.submit(&upload_url).await?;
        debug!(transcript_id = %transcript_id, "transcript job submitted");
        self.poll(&transcript_id).await
    }

    async fn upload(&self, audio_data: &[u8]) -> Result<String, VoiceError> {
        let response = self
            .client
            .post(format!("{}/v2/upload", self.config.base_url))
            .header("authorization", &self.config.api_key)
            .header("content-type", "application/octet-stream")
            .body(audio_data.to_vec())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let upload: UploadResponse =
            decode_json(Stage::Transcription, self.config.timeout_seconds, response).await?;
        Ok(upload.upload_url)
    }

    async fn submit(&self, upload_url: &str) -> Result<String, VoiceError> {
        let response = self
            .client
            .post(format!("{}/v2/transcript", self.config.base_url))
            .header("authorization", &self.config.api_key)
            .json(&json!({ "audio_url": upload_url }))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let transcript: TranscriptResponse =
            decode_json(Stage::Transcription, self.config.timeout_seconds, response).await?;
        Ok(transcript.id)
    }

    async fn poll(&self, transcript_id: &str) -> Result<String, VoiceError> {
        let url = format!("{}/v2/transcript/{}", self.config.base_url, transcript_id);

        loop {
            let response = self
                .client
                .get(&url)
                .header("authorization", &self.config.api_key)
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;

            let transcript: TranscriptResponse =
                decode_json(Stage::Transcription, self.config.timeout_seconds, response).await?;

            match transcript.status.as_str() {
                // A null text means no speech was detected.
                "completed" => return Ok(transcript.text.unwrap_or_default()),
                "error" => {
                    return Err(VoiceError::Transcription(
                        transcript
                            .error
                            .unwrap_or_else(|| "provider reported an error".to_string()),
                    ))
                }
                status => {
                    debug!(transcript_id, status, "transcript not ready");
                    tokio::time::sleep(self.config.poll_interval()).await;
                }
            }
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> VoiceError {
        VoiceError::from_transport(Stage::Transcription, self.config.timeout_seconds, err)
    }
}

impl Transcriber for SttService {
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> GatewayFuture<'a, String> {
        Box::pin(SttService::transcribe(self, audio))
    }
}
