//! Text-to-speech (TTS) via Google Cloud `text:synthesize`

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_TIMEOUT, Service, ServiceError, render, transport};
use crate::{Error, Result};

/// Default Text-to-Speech API host
pub const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com";

/// Default voice language
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Default voice name
pub const DEFAULT_VOICE_NAME: &str = "en-US-Neural2-A";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}

/// Synthesizes speech from text, returning base64-encoded MP3
#[derive(Clone)]
pub struct SynthesisClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language_code: String,
    voice_name: String,
    timeout: Duration,
}

impl SynthesisClient {
    /// Create a new TTS client
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(client: reqwest::Client, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Google TTS API key required".to_string()));
        }

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the API host
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the voice language
    #[must_use]
    pub fn language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    /// Set the voice name
    #[must_use]
    pub fn voice_name(mut self, name: impl Into<String>) -> Self {
        self.voice_name = name.into();
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Synthesize `text` to speech
    ///
    /// # Returns
    ///
    /// Base64 MP3 audio, or a placeholder string such as
    /// `"TTS Request Timeout!"` on failure
    pub async fn synthesize(&self, text: &str) -> String {
        render(Service::Synthesis, self.try_synthesize(text).await)
    }

    /// Synthesize `text` to speech
    ///
    /// # Errors
    ///
    /// Returns error if the call fails or the response has no `audioContent`
    pub async fn try_synthesize(&self, text: &str) -> std::result::Result<String, ServiceError> {
        tracing::debug!(text_chars = text.chars().count(), voice = %self.voice_name, "starting synthesis");

        let url = format!("{}/v1/text:synthesize?key={}", self.base_url, self.api_key);
        let request = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.language_code,
                name: &self.voice_name,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
            },
        };

        let response: SynthesizeResponse =
            transport::post_json(&self.client, &url, &request, self.timeout).await?;
        let audio = response.audio_content.ok_or(ServiceError::FieldMissing)?;

        tracing::info!(audio_b64_chars = audio.len(), "synthesis complete");
        Ok(audio)
    }
}
