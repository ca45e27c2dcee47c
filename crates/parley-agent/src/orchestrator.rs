use crate::pipeline::{EchoResult, QueryFailure, QueryResult};
use parley_session::SessionStore;
use parley_types::{AgentChatResult, Turn, FALLBACK_AUDIO_PATH};
use parley_voice::{ReplyGenerator, SpeechSynthesizer, Stage, Transcriber, VoiceError};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, info_span, warn, Instrument};

/// Upper bounds on each gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub transcription: Duration,
    pub reply: Duration,
    pub synthesis: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            transcription: Duration::from_secs(120),
            reply: Duration::from_secs(60),
            synthesis: Duration::from_secs(60),
        }
    }
}

impl StageTimeouts {
    fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Transcription => self.transcription,
            Stage::ReplyGeneration => self.reply,
            Stage::Synthesis => self.synthesis,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Audio returned whenever the pipeline fails.
    pub fallback_audio_path: String,
    pub timeouts: StageTimeouts,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fallback_audio_path: FALLBACK_AUDIO_PATH.to_string(),
            timeouts: StageTimeouts::default(),
        }
    }
}

/// Drives transcription, reply generation and synthesis for one turn and
/// keeps the session history current.
///
/// Gateways are injected, so the orchestrator holds no provider state of its
/// own; clones share the same gateways and session store.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    transcriber: Arc<dyn Transcriber>,
    replies: Arc<dyn ReplyGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    sessions: SessionStore,
    config: OrchestratorConfig,
}

impl ConversationOrchestrator {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        replies: Arc<dyn ReplyGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        sessions: SessionStore,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            transcriber,
            replies,
            synthesizer,
            sessions,
            config,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn fallback_audio_path(&self) -> &str {
        &self.config.fallback_audio_path
    }

    /// Runs one conversational turn for `session_id`.
    ///
    /// Never fails: any gateway error aborts the remaining steps and yields
    /// the fallback audio with the error text in `detail`. Turns appended
    /// before the failing step stay in the history.
    pub async fn handle_chat_turn(&self, session_id: &str, audio: &[u8]) -> AgentChatResult {
        let turn = self
            .run_chat_turn(session_id, audio)
            .instrument(info_span!("chat_turn", session_id));
        match turn.await {
            Ok(audio_url) => AgentChatResult::success(audio_url),
            Err(e) => {
                warn!(session_id, error = %e, "chat turn failed, returning fallback audio");
                AgentChatResult::failure(self.config.fallback_audio_path.clone(), e.to_string())
            }
        }
    }

    async fn run_chat_turn(&self, session_id: &str, audio: &[u8]) -> Result<String, VoiceError> {
        let started = Instant::now();

        // Held until the turn completes so same-session turns cannot interleave.
        let mut session = self.sessions.lock(session_id).await;

        let user_text = match self.transcribe(audio).await {
            Ok(text) => text,
            Err(e) => {
                // A session that never got a turn should not occupy a slot.
                drop(session);
                self.sessions.discard_if_empty(session_id);
                return Err(e);
            }
        };
        info!(session_id, transcript = %user_text, "transcribed user audio");
        session.append(Turn::user(user_text));

        let ai_text = self
            .timed(
                Stage::ReplyGeneration,
                self.replies.generate_reply(session.turns()),
            )
            .await?;
        info!(session_id, turns = session.turns().len(), "generated reply");
        session.append(Turn::assistant(ai_text.clone()));

        let audio_url = self.speak(&ai_text).await?;

        info!(
            session_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chat turn complete"
        );
        Ok(audio_url)
    }

    /// Transcribes `audio` without touching any session.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String, VoiceError> {
        self.timed(Stage::Transcription, self.transcriber.transcribe(audio))
            .await
    }

    /// Synthesizes `text` and returns the hosted audio URL.
    pub async fn speak(&self, text: &str) -> Result<String, VoiceError> {
        self.timed(Stage::Synthesis, self.synthesizer.synthesize(text))
            .await
    }

    /// Speaks the transcript of `audio` back to the caller.
    pub async fn echo(&self, audio: &[u8]) -> Result<EchoResult, VoiceError> {
        let transcript = self.transcribe(audio).await?;
        let audio_url = self.speak(&transcript).await?;
        Ok(EchoResult {
            audio_url,
            transcript,
        })
    }

    /// Answers a single utterance with no conversation history.
    ///
    /// The transcript is sent to the model as the whole prompt and the reply
    /// is spoken as returned.
    pub async fn query(&self, audio: &[u8]) -> Result<QueryResult, QueryFailure> {
        let started = Instant::now();
        let transcript = self
            .transcribe(audio)
            .await
            .map_err(|error| QueryFailure::new(None, error))?;

        let llm_response = match self
            .timed(
                Stage::ReplyGeneration,
                self.replies.generate_content(&transcript),
            )
            .await
        {
            Ok(reply) => reply,
            Err(error) => return Err(QueryFailure::new(Some(transcript), error)),
        };

        let audio_url = match self.speak(&llm_response).await {
            Ok(url) => url,
            Err(error) => return Err(QueryFailure::new(Some(transcript), error)),
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "single query complete"
        );
        Ok(QueryResult {
            transcript,
            llm_response,
            audio_url,
        })
    }

    /// Bounds one gateway call by its stage timeout and logs how long it took.
    async fn timed<T>(
        &self,
        stage: Stage,
        call: impl Future<Output = Result<T, VoiceError>>,
    ) -> Result<T, VoiceError> {
        let limit = self.config.timeouts.for_stage(stage);
        let started = Instant::now();
        let outcome = tokio::time::timeout(limit, call).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                info!(
                    stage = stage.as_str(),
                    elapsed_ms,
                    ok = result.is_ok(),
                    "gateway call finished"
                );
                result
            }
            Err(_) => {
                warn!(stage = stage.as_str(), elapsed_ms, "gateway call timed out");
                Err(VoiceError::Timeout {
                    stage,
                    seconds: limit.as_secs(),
                })
            }
        }
    }
}
