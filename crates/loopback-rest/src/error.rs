//! Mapping of HTTP failures into [`AppError`].

use reqwest::StatusCode;
use serde::Deserialize;

use loopback_core::error::{AppError, ErrorKind};

/// LoopBack's error envelope: `{"error": {"statusCode": 404, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Build the error for a non-success response from its status and body.
pub fn status_error(status: StatusCode, body: &[u8]) -> AppError {
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| {
            envelope
                .error
                .message
                .or(envelope.error.name)
                .filter(|m| !m.is_empty())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response status")
                .to_string()
        });
    AppError::from_status(status.as_u16(), message)
}

/// Map a `reqwest` failure that happened before a response was available.
pub fn transport_error(err: reqwest::Error) -> AppError {
    let message = if err.is_timeout() {
        format!("Request timed out: {err}")
    } else if err.is_connect() {
        format!("Connection failed: {err}")
    } else if err.is_decode() {
        return AppError::with_source(
            ErrorKind::InvalidResponse,
            format!("Failed to decode response: {err}"),
            err,
        );
    } else {
        format!("HTTP request failed: {err}")
    };
    let status = err.status().map(|s| s.as_u16());
    let mut error = AppError::with_source(ErrorKind::Transport, message, err);
    error.status = status;
    error
}
