//! API error taxonomy and the uniform error envelope.
//!
//! Every failed request leaves the system as
//! `{"success": false, "error": {"message", "details"}}`. Errors raised as
//! `ApiError` render the envelope directly; anything else is wrapped by the
//! normalizer middleware on the way out.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::auth::CHALLENGE_SCHEME;

/// Error category, attached to error responses as a response extension so
/// the normalizer can act on it after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Version,
    NotFound,
    Validation,
    Internal,
}

/// Marker extension: the body already carries the canonical envelope.
#[derive(Debug, Clone, Copy)]
pub struct Enveloped;

/// Errors surfaced to API callers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credential absent-but-required, unknown, expired, or a wrapped
    /// internal fault. Always a 401.
    #[error("{0}")]
    Authentication(String),

    /// Requested API version is not supported.
    #[error("{0}")]
    UnsupportedVersion(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// Internal fault; the detail string is logged, not exposed.
    #[error("internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Authentication(_) => StatusCode::UNAUTHORIZED,
            ApiError::UnsupportedVersion(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Authentication(_) => ErrorKind::Authentication,
            ApiError::UnsupportedVersion(_) => ErrorKind::Version,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Validation(_) => ErrorKind::Validation,
            ApiError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// The uniform failure-response shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub details: Value,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>, details: Value) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                message: message.into(),
                details,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "Internal error surfaced to caller");
        }

        let kind = self.kind();
        let details = match &self {
            ApiError::UnsupportedVersion(_) => json!({ "kind": "unsupported_version" }),
            _ => Value::Null,
        };
        let envelope = ErrorEnvelope::new(self.to_string(), details);

        let mut response = (self.status(), Json(envelope)).into_response();
        response.extensions_mut().insert(kind);
        response.extensions_mut().insert(Enveloped);

        if kind == ErrorKind::Authentication {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(CHALLENGE_SCHEME),
            );
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Authentication("invalid API key".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::UnsupportedVersion("v9".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound("report".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_envelope_shape() {
        let envelope = ErrorEnvelope::new("invalid API key", Value::Null);
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], json!(false));
        assert_eq!(value["error"]["message"], json!("invalid API key"));
        assert_eq!(value["error"]["details"], Value::Null);
    }

    #[test]
    fn test_auth_error_response_carries_challenge() {
        let response = ApiError::Authentication("invalid API key".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "X-API-Key"
        );
        assert_eq!(
            response.extensions().get::<ErrorKind>(),
            Some(&ErrorKind::Authentication)
        );
        assert!(response.extensions().get::<Enveloped>().is_some());
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err = ApiError::Internal("connection pool exhausted".into());
        assert_eq!(err.to_string(), "internal server error");
    }
}
