//! Raw audio upload endpoint.
//!
//! Stores the uploaded file under the configured upload directory. Errors
//! are reported in the body with status 200, which existing clients expect.

use crate::{api::read_upload, AppState};
use axum::{
    extract::{Extension, Multipart},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Response body for a stored upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are dropped so the result can never name a parent or hidden
/// entry.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "audio".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Handler for `POST /upload-audio`.
pub async fn upload_audio_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Response {
    match store_upload(&state, &mut multipart).await {
        Ok(stored) => Json(stored).into_response(),
        Err(message) => {
            tracing::warn!(error = %message, "audio upload failed");
            Json(json!({ "error": message })).into_response()
        }
    }
}

async fn store_upload(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<UploadResponse, String> {
    let upload = read_upload(multipart, state.max_upload_bytes)
        .await
        .map_err(|e| e.to_string())?;

    let original = upload.file_name.as_deref().unwrap_or("audio");
    let filename = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_filename(original)
    );

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| format!("failed to create upload dir: {}", e))?;

    let path: PathBuf = state.upload_dir.join(&filename);
    tokio::fs::write(&path, &upload.data)
        .await
        .map_err(|e| format!("failed to write file: {}", e))?;

    tracing::info!(path = %path.display(), size = upload.data.len(), "stored audio upload");

    Ok(UploadResponse {
        filename,
        content_type: upload.content_type,
        size: upload.data.len(),
    })
}
