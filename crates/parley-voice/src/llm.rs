use crate::config::ReplyConfig;
use crate::error::{Stage, VoiceError};
use crate::gateway::{GatewayFuture, ReplyGenerator};
use crate::http::{build_client, decode_json};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Reply generation through the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct LlmService {
    client: reqwest::Client,
    config: ReplyConfig,
}

impl LlmService {
    pub fn new(config: ReplyConfig) -> Result<Self, VoiceError> {
        let client = build_client(Stage::ReplyGeneration, config.timeout())?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Sends `prompt` as a single user message and returns the generated text.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, VoiceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let request_body = json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                VoiceError::from_transport(Stage::ReplyGeneration, self.config.timeout_seconds, e)
            })?;

        let parsed: GenerateContentResponse =
            decode_json(Stage::ReplyGeneration, self.config.timeout_seconds, response).await?;

        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, VoiceError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| VoiceError::ReplyGeneration("response has no candidates".to_string()))?;

    let texts: Vec<String> = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if texts.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "unknown".to_string());
        return Err(VoiceError::ReplyGeneration(format!(
            "response has no text (finish reason: {reason})"
        )));
    }

    Ok(texts.concat())
}

impl ReplyGenerator for LlmService {
    fn generate_content<'a>(&'a self, prompt: &'a str) -> GatewayFuture<'a, String> {
        Box::pin(LlmService::generate_content(self, prompt))
    }
}
