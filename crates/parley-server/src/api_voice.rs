//! Stateless voice endpoints: synthesis, transcription, echo and single
//! history-free queries.

use crate::{
    api::{read_upload, ApiError},
    AppState,
};
use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_agent::QueryResult;
use parley_types::FALLBACK_REPLY_TEXT;
use parley_voice::VoiceError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Request body for `POST /generate-audio`.
#[derive(Debug, Deserialize)]
pub struct GenerateAudioRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudioUrlResponse {
    pub audio_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

fn failure(body: serde_json::Value) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Handler for `POST /generate-audio`.
pub async fn generate_audio_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<GenerateAudioRequest>,
) -> Response {
    match state.orchestrator.speak(&request.text).await {
        Ok(audio_url) => Json(AudioUrlResponse { audio_url }).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "text to speech failed");
            failure(json!({ "detail": e.to_string() }))
        }
    }
}

/// Handler for `POST /transcribe/file`.
pub async fn transcribe_file_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(&mut multipart, state.max_upload_bytes).await?;

    Ok(match state.orchestrator.transcribe(&upload.data).await {
        Ok(transcript) => Json(TranscriptResponse { transcript }).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "transcription failed");
            failure(json!({ "detail": transcription_detail(&e) }))
        }
    })
}

/// `VoiceError::Transcription` already reads "Transcription failed: ..."; the
/// other variants get the prefix added.
fn transcription_detail(error: &VoiceError) -> String {
    match error {
        VoiceError::Transcription(_) => error.to_string(),
        other => format!("Transcription failed: {other}"),
    }
}

/// Handler for `POST /tts/echo`.
pub async fn echo_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(&mut multipart, state.max_upload_bytes).await?;

    Ok(match state.orchestrator.echo(&upload.data).await {
        Ok(echo) => Json(echo).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "echo failed");
            failure(json!({ "error": e.to_string() }))
        }
    })
}

/// Handler for `POST /llm/query`.
///
/// On failure the body still has the success shape, filled with the
/// fallback audio, a canned reply and whatever transcript was obtained.
pub async fn llm_query_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(&mut multipart, state.max_upload_bytes).await?;

    Ok(match state.orchestrator.query(&upload.data).await {
        Ok(result) => Json::<QueryResult>(result).into_response(),
        Err(failed) => {
            tracing::warn!(error = %failed, "single query failed");
            failure(json!({
                "transcript": failed.transcript.unwrap_or_default(),
                "llm_response": FALLBACK_REPLY_TEXT,
                "audio_url": state.orchestrator.fallback_audio_path(),
                "detail": failed.error.to_string(),
            }))
        }
    })
}
