use parley_agent::{ConversationOrchestrator, OrchestratorConfig, StageTimeouts};
use parley_session::SessionStore;
use parley_voice::{GatewayFuture, ReplyGenerator, SpeechSynthesizer, Transcriber, VoiceError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behaviour for one gateway call.
#[derive(Debug, Clone)]
pub enum Step {
    Ok(String),
    Fail(String),
    Hang,
}

impl Step {
    pub fn ok(text: &str) -> Self {
        Self::Ok(text.to_string())
    }

    pub fn fail(message: &str) -> Self {
        Self::Fail(message.to_string())
    }
}

async fn play(
    step: Step,
    delay: Duration,
    fail: fn(String) -> VoiceError,
) -> Result<String, VoiceError> {
    tokio::time::sleep(delay).await;
    match step {
        Step::Ok(text) => Ok(text),
        Step::Fail(message) => Err(fail(message)),
        Step::Hang => std::future::pending().await,
    }
}

/// Replays queued steps in call order and records every input it saw.
pub struct FakeGateway {
    steps: Mutex<VecDeque<Step>>,
    default: Step,
    delay: Duration,
    pub inputs: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn always(step: Step) -> Arc<Self> {
        Self::scripted(Vec::new(), step)
    }

    pub fn scripted(steps: Vec<Step>, default: Step) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(VecDeque::from(steps)),
            default,
            delay: Duration::ZERO,
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn slow(steps: Vec<Step>, default: Step, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(VecDeque::from(steps)),
            default,
            delay,
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }

    fn next(&self, input: String) -> Step {
        self.inputs.lock().unwrap().push(input);
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

impl Transcriber for FakeGateway {
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> GatewayFuture<'a, String> {
        let step = self.next(String::from_utf8_lossy(audio).into_owned());
        Box::pin(play(step, self.delay, VoiceError::Transcription))
    }
}

impl ReplyGenerator for FakeGateway {
    fn generate_content<'a>(&'a self, prompt: &'a str) -> GatewayFuture<'a, String> {
        let step = self.next(prompt.to_string());
        Box::pin(play(step, self.delay, VoiceError::ReplyGeneration))
    }
}

impl SpeechSynthesizer for FakeGateway {
    fn synthesize<'a>(&'a self, text: &'a str) -> GatewayFuture<'a, String> {
        let step = self.next(text.to_string());
        Box::pin(play(step, self.delay, VoiceError::Synthesis))
    }
}

pub struct Harness {
    pub orchestrator: ConversationOrchestrator,
    pub stt: Arc<FakeGateway>,
    pub llm: Arc<FakeGateway>,
    pub tts: Arc<FakeGateway>,
}

pub fn harness(stt: Arc<FakeGateway>, llm: Arc<FakeGateway>, tts: Arc<FakeGateway>) -> Harness {
    harness_with_store(stt, llm, tts, SessionStore::default())
}

pub fn harness_with_store(
    stt: Arc<FakeGateway>,
    llm: Arc<FakeGateway>,
    tts: Arc<FakeGateway>,
    sessions: SessionStore,
) -> Harness {
    let config = OrchestratorConfig {
        fallback_audio_path: "/static/fallback.mp3".to_string(),
        timeouts: StageTimeouts {
            transcription: Duration::from_secs(5),
            reply: Duration::from_secs(5),
            synthesis: Duration::from_secs(5),
        },
    };
    let orchestrator = ConversationOrchestrator::new(
        stt.clone(),
        llm.clone(),
        tts.clone(),
        sessions,
        config,
    );
    Harness {
        orchestrator,
        stt,
        llm,
        tts,
    }
}
