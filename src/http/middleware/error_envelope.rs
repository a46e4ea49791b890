//! Exception normalization.
//!
//! The outermost response shaper: any error response leaving the stack is
//! logged with its correlation ID and converted to the uniform envelope.
//! Responses built from `ApiError` already carry the envelope and are only
//! logged (and, for authentication errors, forced to 401); everything else
//! has its body preserved under `details`.

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::http::error::{Enveloped, ErrorEnvelope, ErrorKind};
use crate::http::middleware::request_id::RequestId;

/// Error bodies larger than this are replaced rather than preserved.
const MAX_NORMALIZED_BODY: usize = 256 * 1024;

pub async fn error_envelope_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    let response = next.run(request).await;
    normalize(response, &method, &path, &request_id).await
}

/// Shape an outgoing response into the canonical error envelope.
pub(crate) async fn normalize(
    response: Response,
    method: &Method,
    path: &str,
    request_id: &str,
) -> Response {
    let status = response.status();
    let kind = response.extensions().get::<ErrorKind>().copied();

    if !status.is_client_error() && !status.is_server_error() && kind.is_none() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let already_enveloped = parts.extensions.get::<Enveloped>().is_some();

    let bytes = match to_bytes(body, MAX_NORMALIZED_BODY).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Error body exceeded normalization cap");
            Bytes::new()
        }
    };

    // Authentication failures surface as 401 no matter what a lower layer set.
    if kind == Some(ErrorKind::Authentication) {
        parts.status = StatusCode::UNAUTHORIZED;
    }

    let (message, out_bytes) = if already_enveloped {
        let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| canonical_message(parts.status));
        (message, bytes)
    } else {
        let details: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        let message = match &details {
            Value::String(text) => text.clone(),
            _ => canonical_message(parts.status),
        };

        let envelope = ErrorEnvelope::new(message.clone(), details);
        let body = serde_json::to_vec(&envelope).unwrap_or_default();

        parts.headers.remove(header::CONTENT_LENGTH);
        parts
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        parts.extensions.insert(Enveloped);
        (message, Bytes::from(body))
    };

    tracing::error!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = parts.status.as_u16(),
        kind = ?kind,
        message = %message,
        "Request failed"
    );

    Response::from_parts(parts, Body::from(out_bytes))
}

fn canonical_message(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("error").to_string()
}
