//! Conversation orchestration for the parley voice agent.
//!
//! [`ConversationOrchestrator::handle_chat_turn`] is the core pipeline:
//!
//! 1. transcribe the uploaded audio,
//! 2. append the user turn to the session history,
//! 3. generate a reply from the full history,
//! 4. append the assistant turn,
//! 5. synthesize the reply and return its audio URL.
//!
//! Steps run strictly in sequence while the session is held exclusively.
//! Any failure collapses into the fallback result; history updates made
//! before the failure are kept (at-least-once, no rollback).
//!
//! The orchestrator also exposes the stateless pipelines the HTTP surface
//! offers next to the chat endpoint: transcription only, echo, and a single
//! history-free query.

pub mod orchestrator;
pub mod pipeline;

pub use orchestrator::{ConversationOrchestrator, OrchestratorConfig, StageTimeouts};
pub use pipeline::{EchoResult, QueryFailure, QueryResult};
