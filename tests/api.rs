//! API endpoint integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use focusmate_gateway::api::gateway::MAX_TRANSCRIBE_BODY_BYTES;
use focusmate_gateway::api::{ApiServerBuilder, ApiState};
use focusmate_gateway::config::file::GatewayConfigFile;
use focusmate_gateway::Config;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{body_string, form_post, router_for, state_for};

const GENERATE_PATH: &str = "/v1/models/gemini-1.5-flash:generateContent";
const SYNTHESIZE_PATH: &str = "/v1/text:synthesize";
const RECOGNIZE_PATH: &str = "/v1/speech:recognize";

async fn mount_generation(server: &MockServer, prompt: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": reply }], "role": "model" } }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_synthesis(server: &MockServer, text: &str, audio: &str) {
    Mock::given(method("POST"))
        .and(path(SYNTHESIZE_PATH))
        .and(body_partial_json(serde_json::json!({ "input": { "text": text } })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "audioContent": audio })),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = MockServer::start().await;
    let app = router_for(&server);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_index_serves_page() {
    let server = MockServer::start().await;
    let app = router_for(&server);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    assert!(body_string(response).await.contains("<title>FocusMate</title>"));
}

#[tokio::test]
async fn test_static_dir_replaces_embedded_page() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<p>custom page</p>").unwrap();

    let server = MockServer::start().await;
    let app = ApiServerBuilder::new(state_for(&server.uri()), 0)
        .static_dir(Some(dir.path().to_path_buf()))
        .build()
        .router();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<p>custom page</p>");
}

#[tokio::test]
async fn test_generate_joins_text_and_audio() {
    let server = MockServer::start().await;
    mount_generation(&server, "Hello", "Hi there").await;
    mount_synthesis(&server, "Hi there", "c2FtcGxl").await;

    let response = router_for(&server)
        .oneshot(form_post("/generate", "prompt=Hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_string(response).await, "Hi there||c2FtcGxl");
}

#[tokio::test]
async fn test_generate_decodes_form_prompt() {
    let server = MockServer::start().await;
    mount_generation(&server, "what's 2+2?", "4").await;
    mount_synthesis(&server, "4", "Zm91cg==").await;

    let response = router_for(&server)
        .oneshot(form_post("/generate", "prompt=what%27s+2%2B2%3F"))
        .await
        .unwrap();

    assert_eq!(body_string(response).await, "4||Zm91cg==");
}

#[tokio::test]
async fn test_generate_json_reply() {
    let server = MockServer::start().await;
    mount_generation(&server, "Hello", "Hi there").await;
    mount_synthesis(&server, "Hi there", "c2FtcGxl").await;

    let mut request = form_post("/generate", "prompt=Hello");
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/json".parse().unwrap());

    let response = router_for(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["text"], "Hi there");
    assert_eq!(json["audio"], "c2FtcGxl");
}

#[tokio::test]
async fn test_generate_speaks_generation_placeholder() {
    let server = MockServer::start().await;
    Mock::given(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    mount_synthesis(&server, "Unable to extract text", "QQ==").await;

    let response = router_for(&server)
        .oneshot(form_post("/generate", "prompt=Hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Unable to extract text||QQ==");
}

#[tokio::test]
async fn test_generate_with_unreachable_services() {
    let app = ApiServerBuilder::new(state_for("http://127.0.0.1:1"), 0)
        .build()
        .router();

    let response = app
        .oneshot(form_post("/generate", "prompt=Hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_string(response).await,
        "Connection to server failed!||TTS Connection failed!"
    );
}

#[tokio::test]
async fn test_generate_without_prompt_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let response = router_for(&server)
        .oneshot(form_post("/generate", "other=field"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_generate_rejects_get() {
    let server = MockServer::start().await;

    let response = router_for(&server)
        .oneshot(Request::builder().uri("/generate").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_transcribe_returns_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RECOGNIZE_PATH))
        .and(query_param("key", "stt-test-key"))
        .and(body_partial_json(serde_json::json!({
            "config": { "encoding": "WEBM_OPUS", "sampleRateHertz": 48000 },
            "audio": { "content": "R2VuZXJhdGVk+/=" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{ "alternatives": [{ "transcript": "turn on the lamp" }] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = router_for(&server)
        .oneshot(form_post("/transcribe", "audio=R2VuZXJhdGVk%2B%2F%3D"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "turn on the lamp");
}

#[tokio::test]
async fn test_transcribe_json_reply_with_placeholder() {
    let server = MockServer::start().await;
    Mock::given(path(RECOGNIZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut request = form_post("/transcribe", "audio=AAAA");
    request
        .headers_mut()
        .insert(header::ACCEPT, "application/json".parse().unwrap());

    let response = router_for(&server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(
        json["transcript"]
            .as_str()
            .unwrap()
            .starts_with("JSON parsing error: ")
    );
}

#[tokio::test]
async fn test_transcribe_without_audio_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let response = router_for(&server)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/transcribe")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_transcribe_accepts_long_recording() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RECOGNIZE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{ "alternatives": [{ "transcript": "long recording" }] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Past axum's 2 MB default limit
    let body = format!("audio={}", "A".repeat(2_200_000));
    let response = router_for(&server)
        .oneshot(form_post("/transcribe", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "long recording");
}

#[tokio::test]
async fn test_transcribe_rejects_oversized_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let body = format!("audio={}", "A".repeat(MAX_TRANSCRIBE_BODY_BYTES));
    let response = router_for(&server)
        .oneshot(form_post("/transcribe", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_state_from_config_applies_overrides() {
    let server = MockServer::start().await;
    Mock::given(path("/v1/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "cfg-gemini"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "configured" }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path(SYNTHESIZE_PATH))
        .and(query_param("key", "cfg-tts"))
        .and(body_partial_json(serde_json::json!({
            "voice": { "languageCode": "en-GB", "name": "en-GB-Neural2-B" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "audioContent": "b2s=" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let env = move |name: &str| {
        let value = match name {
            "GEMINI_API_KEY" => "cfg-gemini",
            "GOOGLE_TTS_API_KEY" => "cfg-tts",
            "GOOGLE_STT_API_KEY" => "cfg-stt",
            "FOCUSMATE_GEMINI_MODEL" => "gemini-2.0-flash",
            "FOCUSMATE_VOICE_LANGUAGE" => "en-GB",
            "FOCUSMATE_VOICE_NAME" => "en-GB-Neural2-B",
            "FOCUSMATE_GEMINI_URL" | "FOCUSMATE_TTS_URL" | "FOCUSMATE_STT_URL" => uri.as_str(),
            _ => return None,
        };
        Some(value.to_string())
    };

    let config = Config::from_sources(GatewayConfigFile::default(), env).unwrap();
    let app = ApiServerBuilder::new(ApiState::from_config(&config).unwrap(), config.server.port)
        .build()
        .router();

    let response = app
        .oneshot(form_post("/generate", "prompt=hi"))
        .await
        .unwrap();

    assert_eq!(body_string(response).await, "configured||b2s=");
}
