//! One JSON POST with a timer-bounded wait and error classification

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::ServiceError;

/// Error envelope returned by Google APIs on non-2xx responses
#[derive(serde::Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Slice `raw` from the first `{`, dropping any preamble before the JSON object
///
/// Returns `raw` unchanged when it contains no `{`, so the parser reports the
/// real problem.
#[must_use]
pub(super) fn json_body(raw: &str) -> &str {
    raw.find('{').map_or(raw, |start| &raw[start..])
}

/// POST `body` as JSON to `url` and decode the response
///
/// The whole exchange (connect, send, read body) must finish within `timeout`.
/// A response whose headers arrive in time but whose body downloads slowly
/// therefore also ends in [`ServiceError::Timeout`].
/// HTTP error statuses are logged but the body is still decoded, so a Google
/// error envelope surfaces as [`ServiceError::FieldMissing`].
pub(super) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    body: &B,
    timeout: Duration,
) -> Result<R, ServiceError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let exchange = async {
        let response = client.post(url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        Ok::<_, reqwest::Error>((status, text))
    };

    let (status, text) = tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| ServiceError::Timeout)??;

    tracing::debug!(status = %status, body_bytes = text.len(), "received response");

    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorResponse>(json_body(&text))
            .map(|e| e.error.message)
            .unwrap_or_default();
        tracing::warn!(status = %status, message = %message, "service returned error status");
    }

    decode(&text)
}

/// Parse the JSON object inside `raw`
pub(super) fn decode<R: DeserializeOwned>(raw: &str) -> Result<R, ServiceError> {
    serde_json::from_str(json_body(raw)).map_err(|e| ServiceError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Probe {
        ok: bool,
    }

    #[test]
    fn json_body_skips_preamble() {
        assert_eq!(json_body("HTTP/1.1 200 OK\r\n\r\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(json_body(")]}'\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn json_body_without_object_is_unchanged() {
        assert_eq!(json_body("not json"), "not json");
        assert_eq!(json_body(""), "");
    }

    #[test]
    fn decode_reads_object_after_preamble() {
        let probe: Probe = decode("garbage {\"ok\": true}").unwrap();
        assert!(probe.ok);
    }

    #[test]
    fn decode_reports_parser_error() {
        let err = decode::<Probe>("{\"ok\": tru").err().unwrap();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }

    #[test]
    fn decode_empty_body_is_malformed() {
        let err = decode::<Probe>("").err().unwrap();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }
}
