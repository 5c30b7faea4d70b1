//! Configuration management for the FocusMate gateway
//!
//! Values are resolved env > TOML file > default. API keys have no default
//! and must come from the environment or the file.

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// Text generation configuration
    pub generation: GenerationConfig,

    /// Speech synthesis and recognition configuration
    pub voice: VoiceConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub bind: String,

    /// Port to listen on
    pub port: u16,

    /// Directory served in place of the embedded page
    pub static_dir: Option<PathBuf>,

    /// Per-call outbound timeout
    pub timeout: Duration,

    /// Skip TLS certificate validation for outbound calls
    pub insecure_tls: bool,
}

/// API keys for the cloud services
#[derive(Clone)]
pub struct ApiKeys {
    /// Gemini API key (`GEMINI_API_KEY`)
    pub gemini: String,

    /// Google Cloud Text-to-Speech key (`GOOGLE_TTS_API_KEY`)
    pub tts: String,

    /// Google Cloud Speech-to-Text key (`GOOGLE_STT_API_KEY`)
    pub stt: String,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("gemini", &"<redacted>")
            .field("tts", &"<redacted>")
            .field("stt", &"<redacted>")
            .finish()
    }
}

/// Text generation configuration
///
/// `None` keeps the client default.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    /// Gemini model identifier
    pub model: Option<String>,

    /// API host override
    pub base_url: Option<String>,
}

/// Voice configuration
///
/// `None` keeps the client default.
#[derive(Debug, Clone, Default)]
pub struct VoiceConfig {
    /// TTS language code
    pub language_code: Option<String>,

    /// TTS voice name
    pub name: Option<String>,

    /// TTS API host override
    pub tts_base_url: Option<String>,

    /// STT recognition language
    pub stt_language_code: Option<String>,

    /// STT API host override
    pub stt_base_url: Option<String>,
}

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 80;

/// Default bind address
pub const DEFAULT_BIND: &str = "0.0.0.0";

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Arguments
    ///
    /// * `config_path` - Explicit TOML file; the standard path is used if `None`
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file is unusable, a value is
    /// malformed, or an API key is missing
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(config_path)?;
        Self::from_sources(fc, |name| std::env::var(name).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a value is malformed or an API key is missing
    pub fn from_sources<F>(fc: file::GatewayConfigFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &str, file_value: Option<String>| {
            env(var)
                .or(file_value)
                .filter(|key| !key.is_empty())
                .ok_or_else(|| Error::Config(format!("{var} is not set")))
        };

        // API keys (env > toml, required)
        let api_keys = ApiKeys {
            gemini: require("GEMINI_API_KEY", fc.api_keys.gemini)?,
            tts: require("GOOGLE_TTS_API_KEY", fc.api_keys.tts)?,
            stt: require("GOOGLE_STT_API_KEY", fc.api_keys.stt)?,
        };

        // Server config (env > toml > default)
        let port = match env("FOCUSMATE_PORT").or_else(|| env("PORT")) {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid port: {raw}")))?,
            None => fc.server.port.unwrap_or(DEFAULT_PORT),
        };

        let timeout_secs = match env("FOCUSMATE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid timeout: {raw}")))?,
            None => fc.server.timeout_secs.unwrap_or(10),
        };
        if timeout_secs == 0 {
            return Err(Error::Config("timeout must be at least one second".to_string()));
        }

        let insecure_tls = env("FOCUSMATE_INSECURE_TLS")
            .map(|v| parse_flag(&v))
            .or(fc.server.insecure_tls)
            .unwrap_or(false);

        let server = ServerConfig {
            bind: env("FOCUSMATE_BIND")
                .or(fc.server.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port,
            static_dir: env("FOCUSMATE_STATIC_DIR")
                .map(PathBuf::from)
                .or(fc.server.static_dir),
            timeout: Duration::from_secs(timeout_secs),
            insecure_tls,
        };

        let generation = GenerationConfig {
            model: env("FOCUSMATE_GEMINI_MODEL").or(fc.generation.model),
            base_url: env("FOCUSMATE_GEMINI_URL").or(fc.generation.base_url),
        };

        let voice = VoiceConfig {
            language_code: env("FOCUSMATE_VOICE_LANGUAGE").or(fc.voice.language_code),
            name: env("FOCUSMATE_VOICE_NAME").or(fc.voice.name),
            tts_base_url: env("FOCUSMATE_TTS_URL").or(fc.voice.tts_base_url),
            stt_language_code: env("FOCUSMATE_STT_LANGUAGE").or(fc.voice.stt_language_code),
            stt_base_url: env("FOCUSMATE_STT_URL").or(fc.voice.stt_base_url),
        };

        Ok(Self {
            server,
            api_keys,
            generation,
            voice,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
