//! API version negotiation.
//!
//! Negotiation itself is a pure function over the request line and headers;
//! the middleware composes it into the pipeline. An unsupported version under
//! the API prefix short-circuits with a 400 before any handler runs; paths
//! outside the prefix are never rejected here.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::schema::{ApiConfig, VersionSource};
use crate::http::error::ApiError;
use crate::http::server::AppState;

pub const X_API_VERSION: HeaderName = HeaderName::from_static("x-api-version");
pub const X_API_SUPPORTED_VERSIONS: HeaderName =
    HeaderName::from_static("x-api-supported-versions");

/// Negotiated API version attached to request extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion(pub u32);

/// Outcome of version negotiation for one request.
#[derive(Debug)]
pub struct Negotiation {
    /// Accepted version, when the request is under the prefix and valid.
    pub version: Option<u32>,
    /// Human-readable rejection reason; set only for invalid requests under
    /// the API prefix.
    pub rejection: Option<String>,
    /// Advisory headers to merge into the outgoing response.
    pub headers: Vec<(HeaderName, HeaderValue)>,
}

fn supported_list(api: &ApiConfig) -> String {
    api.supported_versions
        .iter()
        .map(|v| format!("v{}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a version token such as `v1`, `V1`, or `1`.
fn parse_version(token: &str) -> Option<u32> {
    let digits = token.strip_prefix('v').or_else(|| token.strip_prefix('V')).unwrap_or(token);
    digits.parse().ok()
}

/// Extract the requested version token per the configured strategy.
fn requested_token<'a>(path: &'a str, headers: &'a HeaderMap, api: &ApiConfig) -> Option<&'a str> {
    match api.version_source {
        VersionSource::Path => {
            let rest = path.strip_prefix(api.prefix.as_str())?;
            rest.trim_start_matches('/').split('/').next().filter(|s| !s.is_empty())
        }
        VersionSource::Header => headers
            .get(api.version_header.as_str())
            .and_then(|v| v.to_str().ok()),
    }
}

/// Determine and validate the requested API version.
pub fn negotiate(path: &str, headers: &HeaderMap, api: &ApiConfig) -> Negotiation {
    let under_prefix =
        path == api.prefix || path.starts_with(&format!("{}/", api.prefix));

    if !under_prefix {
        // Version errors are tolerated outside the API surface.
        return Negotiation {
            version: None,
            rejection: None,
            headers: Vec::new(),
        };
    }

    let supported = supported_list(api);
    let mut advisory = Vec::new();
    if let Ok(value) = HeaderValue::from_str(&supported) {
        advisory.push((X_API_SUPPORTED_VERSIONS, value));
    }

    let token = requested_token(path, headers, api);
    let version = token.and_then(parse_version);

    match version {
        Some(v) if api.supported_versions.contains(&v) => {
            if let Ok(value) = HeaderValue::from_str(&format!("v{}", v)) {
                advisory.push((X_API_VERSION, value));
            }
            Negotiation {
                version: Some(v),
                rejection: None,
                headers: advisory,
            }
        }
        Some(_) | None => {
            let rejection = match token {
                Some(token) => format!(
                    "unsupported API version '{}'; supported versions: {}",
                    token, supported
                ),
                None => format!("missing API version; supported versions: {}", supported),
            };
            Negotiation {
                version: None,
                rejection: Some(rejection),
                headers: advisory,
            }
        }
    }
}

pub async fn version_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let negotiation = negotiate(request.uri().path(), request.headers(), &state.config.api);

    if let Some(reason) = negotiation.rejection {
        tracing::debug!(path = %request.uri().path(), %reason, "Rejected API version");
        let mut response = ApiError::UnsupportedVersion(reason).into_response();
        for (name, value) in negotiation.headers {
            response.headers_mut().insert(name, value);
        }
        return response;
    }

    if let Some(version) = negotiation.version {
        request.extensions_mut().insert(ApiVersion(version));
    }

    let advisory = negotiation.headers;
    let mut response = next.run(request).await;
    for (name, value) in advisory {
        response.headers_mut().insert(name, value);
    }
    response
}
