//! Provider gateways for the parley voice agent.
//!
//! Three thin adapters sit between the orchestrator and external services:
//! speech-to-text (AssemblyAI), reply generation (Gemini) and text-to-speech
//! (Murf). Each is an explicit object carrying its own credentials and HTTP
//! client, exposed to the orchestrator through an object-safe trait so tests
//! and alternative providers can be injected.
//!
//! Every failure is a [`VoiceError`] naming the stage it came from. Gateways
//! never retry.

pub mod config;
pub mod error;
pub mod gateway;
mod http;
pub mod llm;
pub mod prompt;
pub mod stt;
pub mod tts;

pub use config::{ReplyConfig, SynthesisConfig, TranscriptionConfig};
pub use error::{Stage, VoiceError};
pub use gateway::{GatewayFuture, ReplyGenerator, SpeechSynthesizer, Transcriber};
pub use llm::LlmService;
pub use prompt::{render_prompt, truncate_chars};
pub use stt::SttService;
pub use tts::TtsService;
