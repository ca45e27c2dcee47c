//! Gateway contracts consumed by the orchestrator.
//!
//! Each trait is object safe so gateways can be injected as
//! `Arc<dyn Trait>`; methods return boxed `Send` futures.

use std::future::Future;
use std::pin::Pin;

use parley_types::Turn;

use crate::error::VoiceError;
use crate::prompt::render_prompt;

pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, VoiceError>> + Send + 'a>>;

/// Converts a fully buffered audio payload to text.
pub trait Transcriber: Send + Sync {
    /// Returns the best-effort transcript. An empty string means the provider
    /// detected no speech and is not an error.
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> GatewayFuture<'a, String>;
}

/// Produces a reply from a language model.
pub trait ReplyGenerator: Send + Sync {
    /// Sends one freeform prompt and returns the model's text untouched.
    fn generate_content<'a>(&'a self, prompt: &'a str) -> GatewayFuture<'a, String>;

    /// Replays the whole history as a flattened prompt and returns the reply
    /// with surrounding whitespace trimmed.
    fn generate_reply<'a>(&'a self, history: &'a [Turn]) -> GatewayFuture<'a, String> {
        Box::pin(async move {
            let prompt = render_prompt(history);
            let reply = self.generate_content(&prompt).await?;
            Ok(reply.trim().to_string())
        })
    }
}

/// Converts text to hosted audio.
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns a URL for the generated audio.
    fn synthesize<'a>(&'a self, text: &'a str) -> GatewayFuture<'a, String>;
}
