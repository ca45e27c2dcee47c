//! Shared types and constants for the parley voice agent.
//!
//! This crate holds the conversation data model (`Turn`, `Role`,
//! `ConversationHistory`) and the orchestrator's result shape. Every other
//! crate in the workspace depends on it; it depends on nothing but `serde`.

pub mod conversation;

pub use conversation::{ConversationHistory, Role, Turn};

use serde::{Deserialize, Serialize};

/// Audio asset returned when the pipeline cannot produce a real reply.
pub const FALLBACK_AUDIO_PATH: &str = "/static/fallback.mp3";

/// Reply text reported by the stateless query pipeline when it fails.
pub const FALLBACK_REPLY_TEXT: &str = "I'm having trouble connecting right now.";

/// Outcome of one conversational turn.
///
/// `audio_url` is always populated so the client can play something: the
/// synthesized reply on success, the fallback asset on failure. `detail` is
/// present only on failure and carries the error text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentChatResult {
    pub audio_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AgentChatResult {
    pub fn success(audio_url: impl Into<String>) -> Self {
        Self {
            audio_url: audio_url.into(),
            detail: None,
        }
    }

    pub fn failure(fallback_audio_url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            audio_url: fallback_audio_url.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.detail.is_none()
    }
}
