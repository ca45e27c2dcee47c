//! Server configuration loading from file and environment variables.

use parley_session::SessionConfig;
use parley_types::FALLBACK_AUDIO_PATH;
use parley_voice::{ReplyConfig, SynthesisConfig, TranscriptionConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable holding the speech-to-text key (required).
pub const TRANSCRIPTION_KEY_VAR: &str = "ASSEMBLYAI_API_KEY";
/// Environment variable holding the language-model key (required).
pub const REPLY_KEY_VAR: &str = "GEMINI_API_KEY";
/// Environment variable holding the speech-synthesis key (optional).
pub const SYNTHESIS_KEY_VAR: &str = "MURF_API_KEY";

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Chat pipeline and file handling settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Session store bounds.
    #[serde(default)]
    pub sessions: SessionConfig,

    /// Speech-to-text provider.
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Language-model provider.
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Text-to-speech provider.
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "parley_agent=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Settings for the chat endpoints and the files they touch.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// URL returned as `audio_url` when the pipeline fails.
    #[serde(default = "default_fallback_audio_path")]
    pub fallback_audio_path: String,

    /// Directory served under `/static`; holds the fallback asset.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Directory where `/upload-audio` stores files.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Largest accepted audio upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fallback_audio_path() -> String {
    FALLBACK_AUDIO_PATH.to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            fallback_audio_path: default_fallback_audio_path(),
            static_dir: default_static_dir(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required provider key is not set.
    #[error("{0} not found in environment")]
    MissingSecret(String),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides and provider keys.
///
/// Environment variable overrides:
/// - `PARLEY_HOST` overrides `server.host`
/// - `PARLEY_PORT` overrides `server.port`
/// - `PARLEY_LOG_LEVEL` overrides `logging.level`
/// - `PARLEY_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `PARLEY_FALLBACK_AUDIO_PATH` overrides `agent.fallback_audio_path`
/// - `PARLEY_STATIC_DIR` overrides `agent.static_dir`
/// - `PARLEY_UPLOAD_DIR` overrides `agent.upload_dir`
/// - `PARLEY_SESSION_CAPACITY` overrides `sessions.capacity`
/// - `PARLEY_SESSION_TTL_SECONDS` overrides `sessions.idle_ttl_seconds`
/// - `PARLEY_LLM_MODEL` overrides `reply.model`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed, or
/// if `ASSEMBLYAI_API_KEY` or `GEMINI_API_KEY` is missing.
pub fn load_config(path: Option<&str>) -> Result<(Config, ConfigOrigin), ConfigError> {
    let (mut config, origin) = read_config_file(path)?;

    let env = |key: &str| std::env::var(key).ok();
    apply_env_overrides(&mut config, env);
    apply_secrets(&mut config, env)?;

    Ok((config, origin))
}

/// Where the file-level settings came from; logged by the caller once
/// tracing is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    File,
    /// No file at the given path (or no path); every section uses defaults.
    Defaults,
}

/// Parses the TOML file at `path`. A missing file yields the defaults.
pub fn read_config_file(path: Option<&str>) -> Result<(Config, ConfigOrigin), ConfigError> {
    let Some(path) = path else {
        return Ok((Config::default(), ConfigOrigin::Defaults));
    };
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok((toml::from_str(&contents)?, ConfigOrigin::File)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok((Config::default(), ConfigOrigin::Defaults))
        }
        Err(e) => Err(ConfigError::FileRead(e)),
    }
}

/// Applies `PARLEY_*` overrides read through `lookup`. Values that fail to
/// parse leave the current setting in place.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = lookup("PARLEY_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = lookup("PARLEY_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(level) = lookup("PARLEY_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("PARLEY_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(path) = lookup("PARLEY_FALLBACK_AUDIO_PATH") {
        config.agent.fallback_audio_path = path;
    }
    if let Some(dir) = lookup("PARLEY_STATIC_DIR") {
        config.agent.static_dir = PathBuf::from(dir);
    }
    if let Some(dir) = lookup("PARLEY_UPLOAD_DIR") {
        config.agent.upload_dir = PathBuf::from(dir);
    }
    if let Some(capacity) = lookup("PARLEY_SESSION_CAPACITY") {
        if let Ok(parsed) = capacity.parse() {
            config.sessions.capacity = parsed;
        }
    }
    if let Some(ttl) = lookup("PARLEY_SESSION_TTL_SECONDS") {
        if let Ok(parsed) = ttl.parse() {
            config.sessions.idle_ttl_seconds = parsed;
        }
    }
    if let Some(model) = lookup("PARLEY_LLM_MODEL") {
        if !model.trim().is_empty() {
            config.reply.model = model.trim().to_string();
        }
    }
}

/// Fills provider keys from `lookup`.
///
/// The speech-to-text and language-model keys are required; the synthesis
/// key may be absent, in which case synthesis fails per request.
pub fn apply_secrets(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    let non_empty = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    config.transcription.api_key = non_empty(TRANSCRIPTION_KEY_VAR)
        .ok_or_else(|| ConfigError::MissingSecret(TRANSCRIPTION_KEY_VAR.to_string()))?;
    config.reply.api_key = non_empty(REPLY_KEY_VAR)
        .ok_or_else(|| ConfigError::MissingSecret(REPLY_KEY_VAR.to_string()))?;

    if let Some(key) = non_empty(SYNTHESIS_KEY_VAR) {
        config.synthesis.api_key = key;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.agent.fallback_audio_path, "/static/fallback.mp3");
        assert_eq!(config.sessions.capacity, 10_000);
        assert_eq!(config.reply.model, "gemini-2.5-flash");
    }

    #[test]
    fn file_sections_override_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9100

            [agent]
            fallback_audio_path = "/assets/sorry.mp3"

            [sessions]
            capacity = 50
            idle_ttl_seconds = 0

            [synthesis]
            voice_id = "en-US-ken"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.agent.fallback_audio_path, "/assets/sorry.mp3");
        assert_eq!(config.agent.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.sessions.capacity, 50);
        assert_eq!(config.sessions.idle_ttl(), None);
        assert_eq!(config.synthesis.voice_id, "en-US-ken");
        assert_eq!(config.synthesis.max_chars, 3000);
    }

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            lookup_from(&[
                ("PARLEY_PORT", "not-a-port"),
                ("PARLEY_HOST", "0.0.0.0"),
                ("PARLEY_LOG_JSON", "1"),
                ("PARLEY_SESSION_CAPACITY", "12"),
                ("PARLEY_LLM_MODEL", " gemini-2.0-flash "),
            ]),
        );

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(config.logging.json);
        assert_eq!(config.sessions.capacity, 12);
        assert_eq!(config.reply.model, "gemini-2.0-flash");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[server]\nport = \"eighty\"\n").unwrap();

        let err = load_config(file.path().to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_default_origin() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");

        let (config, origin) = read_config_file(missing.to_str()).unwrap();
        assert_eq!(origin, ConfigOrigin::Defaults);
        assert_eq!(config.server.port, 8000);

        let (_, origin) = read_config_file(None).unwrap();
        assert_eq!(origin, ConfigOrigin::Defaults);
    }

    #[test]
    fn present_file_reports_file_origin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[server]\nport = 9001\n").unwrap();

        let (config, origin) = read_config_file(file.path().to_str()).unwrap();
        assert_eq!(origin, ConfigOrigin::File);
        assert_eq!(config.server.port, 9001);
    }

    #[test]
    fn missing_required_keys_are_fatal() {
        let mut config = Config::default();
        let err = apply_secrets(&mut config, lookup_from(&[(REPLY_KEY_VAR, "g")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(ref key) if key == TRANSCRIPTION_KEY_VAR));

        let err = apply_secrets(
            &mut config,
            lookup_from(&[(TRANSCRIPTION_KEY_VAR, "a"), (REPLY_KEY_VAR, "   ")]),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "GEMINI_API_KEY not found in environment");
    }

    #[test]
    fn synthesis_key_is_optional() {
        let mut config = Config::default();
        apply_secrets(
            &mut config,
            lookup_from(&[(TRANSCRIPTION_KEY_VAR, "a"), (REPLY_KEY_VAR, "g")]),
        )
        .expect("synthesis key is optional");

        assert_eq!(config.transcription.api_key, "a");
        assert_eq!(config.reply.api_key, "g");
        assert!(config.synthesis.api_key.is_empty());
    }
}
