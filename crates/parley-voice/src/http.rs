//! Response handling shared by the HTTP-backed gateways.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::error::{Stage, VoiceError};

/// Longest slice of a raw error body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

pub(crate) fn build_client(stage: Stage, timeout: Duration) -> Result<reqwest::Client, VoiceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| VoiceError::Config(format!("failed to build {stage} http client: {e}")))
}

/// Reads a provider response, rejecting non-2xx statuses, and decodes the
/// body as `T`.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    stage: Stage,
    timeout_seconds: u64,
    response: reqwest::Response,
) -> Result<T, VoiceError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| VoiceError::from_transport(stage, timeout_seconds, e))?;

    if !status.is_success() {
        return Err(VoiceError::for_stage(
            stage,
            format!(
                "status={} message={}",
                status.as_u16(),
                provider_error_message(&body)
            ),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        VoiceError::for_stage(stage, format!("invalid provider payload: {e}"))
    })
}

/// Extracts a human-readable message from a provider error body.
///
/// Understands `{"error": "..."}`, `{"error": {"message": "..."}}` and
/// `{"errorMessage": "..."}`; anything else is echoed, shortened.
fn provider_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = match &value["error"] {
            Value::String(message) => Some(message.clone()),
            Value::Object(details) => details
                .get("message")
                .and_then(Value::as_str)
                .map(ToString::to_string),
            _ => None,
        }
        .or_else(|| {
            value["errorMessage"]
                .as_str()
                .map(ToString::to_string)
        });
        if let Some(message) = message {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }
    crate::prompt::truncate_chars(trimmed, MAX_ERROR_BODY_CHARS).to_string()
}
