//! Browser-facing endpoints: prompt → text + speech, and speech → transcript
//!
//! Both endpoints answer 200 whatever happens upstream; failures arrive as
//! placeholder strings in the body. Plain-text bodies are the default, JSON is
//! returned when the request sends `Accept: application/json`.

use std::sync::Arc;

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::ApiState;

/// Separator between text and audio in the plain-text generate reply
pub const REPLY_DELIMITER: &str = "||";

/// Largest `/transcribe` body accepted
///
/// Covers the base64 form of a 10 MB synchronous recognize payload.
pub const MAX_TRANSCRIBE_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build gateway router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route(
            "/transcribe",
            post(transcribe).layer(DefaultBodyLimit::max(MAX_TRANSCRIBE_BODY_BYTES)),
        )
        .with_state(state)
}

/// Generate form body
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub prompt: Option<String>,
}

/// Generated text and its synthesized audio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReply {
    /// Generated text or placeholder
    pub text: String,
    /// Base64 MP3 or placeholder
    pub audio: String,
}

impl GenerateReply {
    /// Render as `"<text>||<audio>"`
    #[must_use]
    pub fn to_delimited(&self) -> String {
        format!("{}{REPLY_DELIMITER}{}", self.text, self.audio)
    }
}

/// Transcribe form body
#[derive(Debug, Deserialize)]
pub struct TranscribeForm {
    pub audio: Option<String>,
}

/// Transcription reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscribeReply {
    pub transcript: String,
}

/// Generate text for a prompt, then speak it
///
/// Synthesis runs on whatever generation returned, placeholders included.
async fn generate(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    form: Result<Form<GenerateForm>, FormRejection>,
) -> Response {
    let form = match accept_form(form) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let Some(prompt) = form.and_then(|f| f.prompt) else {
        tracing::debug!("generate request without prompt ignored");
        return StatusCode::OK.into_response();
    };

    // Detached so a closed browser connection does not cancel upstream calls
    let reply = tokio::spawn(async move {
        let text = state.generation.generate(&prompt).await;
        let audio = state.synthesis.synthesize(&text).await;
        GenerateReply { text, audio }
    })
    .await;

    match reply {
        Ok(reply) if wants_json(&headers) => Json(reply).into_response(),
        Ok(reply) => reply.to_delimited().into_response(),
        Err(e) => {
            tracing::error!(error = %e, "generate task failed");
            StatusCode::OK.into_response()
        }
    }
}

/// Transcribe base64 audio
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    form: Result<Form<TranscribeForm>, FormRejection>,
) -> Response {
    let form = match accept_form(form) {
        Ok(form) => form,
        Err(response) => return response,
    };
    let Some(audio) = form.and_then(|f| f.audio) else {
        tracing::debug!("transcribe request without audio ignored");
        return StatusCode::OK.into_response();
    };

    let transcript =
        tokio::spawn(async move { state.transcription.transcribe(&audio).await }).await;

    match transcript {
        Ok(transcript) if wants_json(&headers) => {
            Json(TranscribeReply { transcript }).into_response()
        }
        Ok(transcript) => transcript.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "transcribe task failed");
            StatusCode::OK.into_response()
        }
    }
}

/// Unwrap a form body, treating an undecodable one as absent
///
/// An oversized body is not absent: it is answered with the rejection (413).
fn accept_form<T>(form: Result<Form<T>, FormRejection>) -> Result<Option<T>, Response> {
    match form {
        Ok(Form(f)) => Ok(Some(f)),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(error = %rejection, "request body exceeds limit");
            Err(rejection.into_response())
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "undecodable form body");
            Ok(None)
        }
    }
}

/// Whether the client asked for a JSON reply
fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_reply_joins_both_parts() {
        let reply = GenerateReply {
            text: "Hi there".to_string(),
            audio: "c2FtcGxl".to_string(),
        };
        assert_eq!(reply.to_delimited(), "Hi there||c2FtcGxl");
    }

    #[test]
    fn accept_header_selects_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(header::ACCEPT, "text/plain".parse().unwrap());
        assert!(!wants_json(&headers));

        headers.insert(header::ACCEPT, "application/json, text/plain".parse().unwrap());
        assert!(wants_json(&headers));
    }
}
