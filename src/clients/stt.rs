//! Speech-to-text (STT) via Google Cloud `speech:recognize`

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_TIMEOUT, Service, ServiceError, render, transport};
use crate::{Error, Result};

/// Default Speech-to-Text API host
pub const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com";

/// Default recognition language
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Browser `MediaRecorder` output is WEBM/Opus at 48 kHz
const AUDIO_ENCODING: &str = "WEBM_OPUS";
const SAMPLE_RATE_HERTZ: u32 = 48_000;

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Serialize)]
struct RecognitionAudio<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    transcript: Option<String>,
}

/// Transcribes recorded speech to text
#[derive(Clone)]
pub struct TranscriptionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language_code: String,
    timeout: Duration,
}

impl TranscriptionClient {
    /// Create a new STT client
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(client: reqwest::Client, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("Google STT API key required".to_string()));
        }

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the API host
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the recognition language
    #[must_use]
    pub fn language_code(mut self, code: impl Into<String>) -> Self {
        self.language_code = code.into();
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Transcribe audio to text
    ///
    /// # Arguments
    ///
    /// * `audio_base64` - Base64-encoded WEBM/Opus audio
    pub async fn transcribe(&self, audio_base64: &str) -> String {
        render(Service::Transcription, self.try_transcribe(audio_base64).await)
    }

    /// Transcribe audio to text
    ///
    /// # Errors
    ///
    /// Returns error if the call fails or no transcript was recognized
    pub async fn try_transcribe(&self, audio_base64: &str) -> std::result::Result<String, ServiceError> {
        tracing::debug!(
            audio_bytes = base64::decoded_len_estimate(audio_base64.len()),
            "starting transcription"
        );

        let url = format!("{}/v1/speech:recognize?key={}", self.base_url, self.api_key);
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: AUDIO_ENCODING,
                sample_rate_hertz: SAMPLE_RATE_HERTZ,
                language_code: &self.language_code,
            },
            audio: RecognitionAudio {
                content: audio_base64,
            },
        };

        let response: RecognizeResponse =
            transport::post_json(&self.client, &url, &request, self.timeout).await?;

        let transcript = response
            .results
            .into_iter()
            .next()
            .and_then(|r| r.alternatives.into_iter().next())
            .and_then(|a| a.transcript)
            .ok_or(ServiceError::FieldMissing)?;

        tracing::info!(
            transcript_chars = transcript.chars().count(),
            "transcription complete"
        );
        Ok(transcript)
    }
}
