//! TOML configuration file loading
//!
//! Supports `~/.config/focusmate/config.toml` as a persistent config source.
//! All fields are optional — the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct GatewayConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// API keys for the cloud services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Text generation configuration
    #[serde(default)]
    pub generation: GenerationFileConfig,

    /// Speech synthesis and recognition configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Address to bind (e.g. "0.0.0.0")
    pub bind: Option<String>,

    /// HTTP port
    pub port: Option<u16>,

    /// Directory served in place of the embedded page
    pub static_dir: Option<PathBuf>,

    /// Per-call outbound timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Accept any TLS certificate from the cloud services
    pub insecure_tls: Option<bool>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub gemini: Option<String>,
    pub tts: Option<String>,
    pub stt: Option<String>,
}

/// Text generation configuration
#[derive(Debug, Default, Deserialize)]
pub struct GenerationFileConfig {
    /// Gemini model identifier (e.g. "gemini-1.5-flash")
    pub model: Option<String>,

    /// API host override
    pub base_url: Option<String>,
}

/// Voice configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// TTS language (e.g. "en-US")
    pub language_code: Option<String>,

    /// TTS voice name (e.g. "en-US-Neural2-A")
    pub name: Option<String>,

    /// TTS API host override
    pub tts_base_url: Option<String>,

    /// STT recognition language
    pub stt_language_code: Option<String>,

    /// STT API host override
    pub stt_base_url: Option<String>,
}

/// Load the TOML config file
///
/// An explicit `path` must exist and parse. Without one, the standard path is
/// tried and `GatewayConfigFile::default()` is returned if it is missing or
/// unreadable.
///
/// # Errors
///
/// Returns error if an explicitly given file cannot be read or parsed
pub fn load_config_file(path: Option<&Path>) -> Result<GatewayConfigFile> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        return Ok(config);
    }

    let Some(path) = config_file_path() else {
        return Ok(GatewayConfigFile::default());
    };

    if !path.exists() {
        return Ok(GatewayConfigFile::default());
    }

    let config = match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                GatewayConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            GatewayConfigFile::default()
        }
    };

    Ok(config)
}

/// Return the config file path: `~/.config/focusmate/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("focusmate").join("config.toml"))
}
