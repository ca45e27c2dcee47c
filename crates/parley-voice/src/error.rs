use thiserror::Error;

/// Failures raised by the provider gateways.
///
/// The first three variants name the stage that failed. `Timeout` is the
/// bounded-wait failure shared by all three stages.
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Reply generation failed: {0}")]
    ReplyGeneration(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("{stage} timed out after {seconds} seconds")]
    Timeout { stage: Stage, seconds: u64 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Pipeline stage a gateway belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcription,
    ReplyGeneration,
    Synthesis,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transcription => "transcription",
            Self::ReplyGeneration => "reply generation",
            Self::Synthesis => "speech synthesis",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VoiceError {
    /// Maps a transport error to the failure of `stage`, folding client-side
    /// timeouts into [`VoiceError::Timeout`].
    pub(crate) fn from_transport(stage: Stage, timeout_seconds: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                stage,
                seconds: timeout_seconds,
            };
        }
        Self::for_stage(stage, format!("request failed: {err}"))
    }

    pub(crate) fn for_stage(stage: Stage, message: String) -> Self {
        match stage {
            Stage::Transcription => Self::Transcription(message),
            Stage::ReplyGeneration => Self::ReplyGeneration(message),
            Stage::Synthesis => Self::Synthesis(message),
        }
    }
}
