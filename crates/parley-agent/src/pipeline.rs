//! Results of the stateless single-shot pipelines.

use parley_voice::VoiceError;
use serde::Serialize;
use thiserror::Error;

/// Transcript of an upload spoken back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoResult {
    pub audio_url: String,
    pub transcript: String,
}

/// One question answered without history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub transcript: String,
    pub llm_response: String,
    pub audio_url: String,
}

/// A failed single query, keeping the transcript when transcription had
/// already succeeded.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct QueryFailure {
    pub transcript: Option<String>,
    #[source]
    pub error: VoiceError,
}

impl QueryFailure {
    pub fn new(transcript: Option<String>, error: VoiceError) -> Self {
        Self { transcript, error }
    }
}
