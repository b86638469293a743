use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Upstream failures keep the upstream status and raw body in the message so the
/// operator sees exactly what the external service said.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Malformed extraction response: {0}")]
    MalformedExtraction(String),

    #[error("Document service error: {0}")]
    Llm(String),

    #[error("Agent provisioning failed: {status} {body}")]
    AgentProvisioning { status: u16, body: String },

    #[error("Voice platform error: {status} {body}")]
    VoicePlatform { status: u16, body: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::InvalidJson(_) => (StatusCode::BAD_REQUEST, "INVALID_JSON"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::MalformedExtraction(msg) => {
                tracing::warn!("Malformed extraction response: {msg}");
                (StatusCode::BAD_GATEWAY, "MALFORMED_EXTRACTION")
            }
            AppError::Llm(msg) => {
                tracing::error!("Document service error: {msg}");
                (StatusCode::BAD_GATEWAY, "DOCUMENT_SERVICE_ERROR")
            }
            AppError::AgentProvisioning { status, .. } => {
                tracing::error!("Agent provisioning failed with upstream status {status}");
                (StatusCode::BAD_GATEWAY, "AGENT_PROVISIONING_ERROR")
            }
            AppError::VoicePlatform { status, .. } => {
                tracing::error!("Voice platform returned status {status}");
                (StatusCode::BAD_GATEWAY, "VOICE_PLATFORM_ERROR")
            }
        };

        let message = match &self {
            AppError::Unauthorized => "Access password missing or incorrect".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioning_error_message_carries_status_and_body() {
        let err = AppError::AgentProvisioning {
            status: 422,
            body: r#"{"message":"voiceId is invalid"}"#.to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("422"));
        assert!(text.contains("voiceId is invalid"));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidJson("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::Llm("x".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::AgentProvisioning {
                    status: 0,
                    body: String::new(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::MalformedExtraction("x".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::VoicePlatform {
                    status: 500,
                    body: String::new(),
                },
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
