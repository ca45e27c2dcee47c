//! Shared request plumbing for the HTTP handlers.

use axum::{
    body::Bytes,
    extract::Multipart,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Name of the multipart field that carries the audio upload.
pub const FILE_FIELD: &str = "file";

/// Transport-level failures, as opposed to pipeline failures.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("upload too large: {0}")]
    PayloadTooLarge(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "detail": message
        }));

        (status, body).into_response()
    }
}

/// An audio file read from a multipart request.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Reads the `file` field of a multipart body fully into memory.
///
/// Other fields are skipped. Bodies larger than `max_bytes` are rejected
/// with [`ApiError::PayloadTooLarge`].
pub async fn read_upload(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<UploadedFile, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        if data.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "{} bytes (max {})",
                data.len(),
                max_bytes
            )));
        }

        return Ok(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    Err(ApiError::BadRequest(format!(
        "missing multipart field '{FILE_FIELD}'"
    )))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("multipart error: {}", e.body_text()))
    }
}
