//! Conversational agent endpoint.

use crate::{
    api::{read_upload, ApiError},
    AppState,
};
use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    Json,
};
use parley_types::AgentChatResult;
use std::sync::Arc;

/// Handler for `POST /agent/chat/{session_id}`.
///
/// Runs one turn of the session's conversation. Pipeline failures still
/// answer with a playable URL: the fallback audio, status 500 and the error
/// text in `detail`.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AgentChatResult>), ApiError> {
    let upload = read_upload(&mut multipart, state.max_upload_bytes).await?;

    let result = state
        .orchestrator
        .handle_chat_turn(&session_id, &upload.data)
        .await;

    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(result)))
}
