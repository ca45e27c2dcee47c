//! HTTP surface of the parley voice agent.

pub mod api;
pub mod api_agent;
pub mod api_upload;
pub mod api_voice;
pub mod background;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use config::Config;
use parley_agent::{ConversationOrchestrator, OrchestratorConfig, StageTimeouts};
use parley_session::SessionStore;
use parley_voice::{LlmService, SttService, TtsService, VoiceError};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Conversation pipeline and its session store.
    pub orchestrator: ConversationOrchestrator,
    /// Directory for `/upload-audio` files.
    pub upload_dir: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// Largest accepted audio upload in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires the provider gateways, session store and orchestrator described
    /// by `config`.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Config` if an HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, VoiceError> {
        let transcriber = SttService::new(config.transcription.clone())?;
        let replies = LlmService::new(config.reply.clone())?;
        let synthesizer = TtsService::new(config.synthesis.clone())?;

        if !synthesizer.is_enabled() {
            tracing::warn!(
                "{} not set; speech synthesis will fail and return the fallback audio",
                config::SYNTHESIS_KEY_VAR
            );
        }

        let orchestrator = ConversationOrchestrator::new(
            Arc::new(transcriber),
            Arc::new(replies),
            Arc::new(synthesizer),
            SessionStore::new(&config.sessions),
            OrchestratorConfig {
                fallback_audio_path: config.agent.fallback_audio_path.clone(),
                timeouts: StageTimeouts {
                    transcription: config.transcription.timeout(),
                    reply: config.reply.timeout(),
                    synthesis: config.synthesis.timeout(),
                },
            },
        );

        Ok(Self {
            orchestrator,
            upload_dir: config.agent.upload_dir.clone(),
            static_dir: config.agent.static_dir.clone(),
            max_upload_bytes: config.agent.max_upload_bytes,
        })
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    // Audio uploads need a body limit sized to the configured maximum.
    let upload_routes = Router::new()
        .route("/agent/chat/{session_id}", post(api_agent::chat_handler))
        .route(
            "/transcribe/file",
            post(api_voice::transcribe_file_handler),
        )
        .route("/tts/echo", post(api_voice::echo_handler))
        .route("/llm/query", post(api_voice::llm_query_handler))
        .route("/upload-audio", post(api_upload::upload_audio_handler))
        .layer(DefaultBodyLimit::max(
            state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
        ));

    let router = Router::new()
        .route("/health", get(health))
        .route("/generate-audio", post(api_voice::generate_audio_handler))
        .merge(upload_routes)
        .nest_service("/static", ServeDir::new(&state.static_dir));

    // Serve a bundled page at the root when the static directory has one.
    let index = state.static_dir.join("index.html");
    let router = if index.exists() {
        tracing::info!(path = %index.display(), "serving index page");
        router.route_service("/", ServeFile::new(index))
    } else {
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
