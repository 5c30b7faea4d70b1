//! Outbound adapters for the three cloud services
//!
//! Each adapter has a fallible `try_*` method returning [`ServiceError`] and an
//! infallible method that renders failures to the fixed placeholder strings the
//! browser page expects. Handlers only ever use the infallible form.

mod generation;
mod stt;
mod transport;
mod tts;

use std::time::Duration;

use thiserror::Error;

pub use generation::GenerationClient;
pub use stt::TranscriptionClient;
pub use tts::SynthesisClient;

/// Time allowed for each outbound exchange
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which outbound service an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// Generative text (Gemini)
    Generation,
    /// Text-to-speech
    Synthesis,
    /// Speech-to-text
    Transcription,
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Generation => "generation",
            Self::Synthesis => "synthesis",
            Self::Transcription => "transcription",
        };
        f.write_str(name)
    }
}

/// Failure of a single outbound call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// TCP/TLS connect or transport failure
    #[error("connection failed: {0}")]
    Connection(String),

    /// No complete response within the timeout
    #[error("request timed out")]
    Timeout,

    /// Response body was not valid JSON
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Valid JSON without the expected field
    #[error("expected field missing from response")]
    FieldMissing,
}

impl ServiceError {
    /// Render this error as the placeholder string shown to the browser
    #[must_use]
    pub fn sentinel(&self, service: Service) -> String {
        let fixed = match (self, service) {
            (Self::MalformedResponse(detail), _) => {
                return format!("JSON parsing error: {detail}");
            }
            (Self::Connection(_), Service::Generation) => "Connection to server failed!",
            (Self::Connection(_), Service::Synthesis) => "TTS Connection failed!",
            (Self::Connection(_), Service::Transcription) => "STT Connection failed!",
            (Self::Timeout, Service::Generation) => "Response Timeout!",
            (Self::Timeout, Service::Synthesis) => "TTS Request Timeout!",
            (Self::Timeout, Service::Transcription) => "STT Request Timeout!",
            (Self::FieldMissing, Service::Generation) => "Unable to extract text",
            (Self::FieldMissing, Service::Synthesis) => "Unable to extract audio",
            (Self::FieldMissing, Service::Transcription) => "Unable to transcribe audio",
        };
        fixed.to_string()
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Timeout;
        }
        // The request URL carries the API key
        Self::Connection(e.without_url().to_string())
    }
}

/// Collapse a call result into the string handed back to the browser
pub(crate) fn render(service: Service, result: Result<String, ServiceError>) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!(%service, error = %e, "outbound call failed");
        e.sentinel(service)
    })
}

/// Build the HTTP client shared by all adapters
///
/// Idle connections are not kept, so every call opens its own TLS session.
///
/// # Errors
///
/// Returns error if the TLS backend cannot be initialized
pub fn http_client(insecure_tls: bool) -> crate::Result<reqwest::Client> {
    if insecure_tls {
        tracing::warn!("TLS certificate validation is disabled for outbound calls");
    }

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .danger_accept_invalid_certs(insecure_tls)
        .build()?;

    Ok(client)
}
