use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("Malformed generator response: {0}")]
    MalformedResponse(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Failures of the remote generator itself, as opposed to setup or input problems.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, AppError::Generator(_) | AppError::MalformedResponse(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "The gift generator is not configured on this server".to_string(),
                )
            }
            AppError::Generator(msg) => {
                tracing::error!("Generator error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATOR_ERROR",
                    format!("The gift generator call failed: {msg}"),
                )
            }
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed generator response: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_RESPONSE",
                    "The gift generator returned a response that could not be understood"
                        .to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "ok": false,
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_missing_field() {
        let err = AppError::Validation {
            missing: vec!["occasion", "budget"],
        };
        assert_eq!(err.to_string(), "Missing required fields: occasion, budget");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation { missing: vec!["occasion"] }, StatusCode::BAD_REQUEST),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Configuration("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Generator("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::MalformedResponse("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_generation_failure_classification() {
        assert!(AppError::Generator("down".into()).is_generation_failure());
        assert!(AppError::MalformedResponse("junk".into()).is_generation_failure());
        assert!(!AppError::Configuration("no key".into()).is_generation_failure());
        assert!(!AppError::Validation { missing: vec![] }.is_generation_failure());
    }
}
