#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response},
};
use parley_agent::{ConversationOrchestrator, OrchestratorConfig, StageTimeouts};
use parley_server::AppState;
use parley_session::SessionStore;
use parley_voice::{GatewayFuture, ReplyGenerator, SpeechSynthesizer, Transcriber, VoiceError};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BOUNDARY: &str = "parley-test-boundary";

/// Gateway that answers every call the same way and records its inputs.
pub struct Fixed {
    answer: Result<String, String>,
    pub inputs: Mutex<Vec<String>>,
}

impl Fixed {
    pub fn ok(text: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(text.to_string()),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn fail(message: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(message.to_string()),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }

    fn answer(
        &self,
        input: String,
        fail: fn(String) -> VoiceError,
    ) -> GatewayFuture<'_, String> {
        self.inputs.lock().unwrap().push(input);
        let answer = self.answer.clone().map_err(fail);
        Box::pin(async move { answer })
    }
}

impl Transcriber for Fixed {
    fn transcribe<'a>(&'a self, audio: &'a [u8]) -> GatewayFuture<'a, String> {
        self.answer(
            String::from_utf8_lossy(audio).into_owned(),
            VoiceError::Transcription,
        )
    }
}

impl ReplyGenerator for Fixed {
    fn generate_content<'a>(&'a self, prompt: &'a str) -> GatewayFuture<'a, String> {
        self.answer(prompt.to_string(), VoiceError::ReplyGeneration)
    }
}

impl SpeechSynthesizer for Fixed {
    fn synthesize<'a>(&'a self, text: &'a str) -> GatewayFuture<'a, String> {
        self.answer(text.to_string(), VoiceError::Synthesis)
    }
}

pub fn state(stt: Arc<Fixed>, llm: Arc<Fixed>, tts: Arc<Fixed>, dir: &Path) -> AppState {
    let orchestrator = ConversationOrchestrator::new(
        stt,
        llm,
        tts,
        SessionStore::default(),
        OrchestratorConfig {
            fallback_audio_path: "/static/fallback.mp3".to_string(),
            timeouts: StageTimeouts {
                transcription: Duration::from_secs(5),
                reply: Duration::from_secs(5),
                synthesis: Duration::from_secs(5),
            },
        },
    );
    AppState {
        orchestrator,
        upload_dir: dir.join("uploads"),
        static_dir: dir.join("static"),
        max_upload_bytes: 1024,
    }
}

/// Builds a multipart POST with a single file part.
pub fn multipart_request(uri: &str, field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/webm\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
