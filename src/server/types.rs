use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::inference::EngineError;

pub const MISSING_TEXT_MESSAGE: &str = "Missing 'text' key in request body";
pub const INVALID_TEXT_MESSAGE: &str = "'text' must be a string";
pub const BUSY_MESSAGE: &str = "Server is busy, try again later";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Request for text generation
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct GenerateRequest {
    pub text: String,
}

impl GenerateRequest {
    /// Parses a raw request body.
    ///
    /// Anything that is not a JSON object with a `text` key (empty body, invalid JSON,
    /// `null`, arrays, `{"text": null}`) is a missing-text error. A `text` that is
    /// present but not a string is rejected separately.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::MissingText)?;

        match value.get("text") {
            None | Some(Value::Null) => Err(ApiError::MissingText),
            Some(Value::String(text)) => Ok(Self { text: text.clone() }),
            Some(_) => Err(ApiError::InvalidText),
        }
    }
}

/// Response for text generation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerateResponse {
    pub generated_text: String,
}

/// Error body shared by every failure response
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response for the health endpoint
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub version: String,
}

/// Request-scoped failures and their HTTP mapping
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", MISSING_TEXT_MESSAGE)]
    MissingText,

    #[error("{}", INVALID_TEXT_MESSAGE)]
    InvalidText,

    #[error("{}", BUSY_MESSAGE)]
    Busy,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Busy => ApiError::Busy,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingText | ApiError::InvalidText => StatusCode::BAD_REQUEST,
            ApiError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Runtime details stay in the logs
            ApiError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        };

        (self.status(), Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_field() {
        let request = GenerateRequest::from_body(br#"{"text": "What is the capital of Ireland?"}"#).unwrap();
        assert_eq!(request.text, "What is the capital of Ireland?");
    }

    #[test]
    fn ignores_extra_fields() {
        let request = GenerateRequest::from_body(br#"{"text": "hi", "max_length": 3}"#).unwrap();
        assert_eq!(request.text, "hi");
    }

    #[test]
    fn accepts_empty_text() {
        let request = GenerateRequest::from_body(br#"{"text": ""}"#).unwrap();
        assert_eq!(request.text, "");
    }

    #[test]
    fn missing_text_variants() {
        let bodies: [&[u8]; 7] = [
            b"",
            b"null",
            b"not json",
            b"{}",
            br#"{"prompt": "hi"}"#,
            br#"["text"]"#,
            br#"{"text": null}"#,
        ];
        for body in bodies {
            assert!(
                matches!(GenerateRequest::from_body(body), Err(ApiError::MissingText)),
                "body {:?} should be rejected as missing text",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn non_string_text_is_invalid() {
        for body in [&br#"{"text": 42}"#[..], br#"{"text": ["a"]}"#, br#"{"text": {"a": 1}}"#, br#"{"text": true}"#] {
            assert!(matches!(GenerateRequest::from_body(body), Err(ApiError::InvalidText)));
        }
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(ApiError::MissingText.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidText.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Busy.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::Internal("boom".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn engine_errors_map_to_api_errors() {
        assert!(matches!(ApiError::from(EngineError::Busy), ApiError::Busy));
        assert!(matches!(
            ApiError::from(EngineError::Generation("oom".into())),
            ApiError::Internal(msg) if msg.contains("oom")
        ));
    }

    #[test]
    fn missing_text_message_is_exact() {
        assert_eq!(ApiError::MissingText.to_string(), "Missing 'text' key in request body");
    }
}
