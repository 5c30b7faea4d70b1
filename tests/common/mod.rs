//! Shared test utilities

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use focusmate_gateway::api::{ApiServerBuilder, ApiState};
use focusmate_gateway::{GenerationClient, SynthesisClient, TranscriptionClient};
use wiremock::MockServer;

/// Build gateway state whose three clients all talk to `base_url`
#[must_use]
pub fn state_for(base_url: &str) -> ApiState {
    let http = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("http client");
    let timeout = Duration::from_millis(500);

    ApiState {
        generation: GenerationClient::new(http.clone(), "gemini-test-key".to_string())
            .expect("generation client")
            .base_url(base_url)
            .timeout(timeout),
        synthesis: SynthesisClient::new(http.clone(), "tts-test-key".to_string())
            .expect("synthesis client")
            .base_url(base_url)
            .timeout(timeout),
        transcription: TranscriptionClient::new(http, "stt-test-key".to_string())
            .expect("transcription client")
            .base_url(base_url)
            .timeout(timeout),
    }
}

/// Build the full router against a mock upstream
#[must_use]
pub fn router_for(server: &MockServer) -> Router {
    ApiServerBuilder::new(state_for(&server.uri()), 0)
        .build()
        .router()
}

/// Build a form-encoded POST request
#[must_use]
pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Read a response body as UTF-8
pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
