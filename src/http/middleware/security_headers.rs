//! Security header injection.
//!
//! Appends a fixed set of protective headers to every outgoing response,
//! success or failure. Strict-Transport-Security is the only conditional
//! header: it is emitted only when the request arrived over secure transport
//! (TLS listener or `X-Forwarded-Proto: https` from the fronting proxy).

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;

/// Allow-listed sources cover the Stripe checkout widget and Google Fonts.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' https://js.stripe.com https://checkout.stripe.com; \
style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
font-src 'self' https://fonts.gstatic.com; \
frame-src https://js.stripe.com https://checkout.stripe.com; \
img-src 'self' data:; \
connect-src 'self' https://api.stripe.com";

pub const STRICT_TRANSPORT_SECURITY: &str = "max-age=31536000; includeSubDomains; preload";

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// The unconditional header set.
pub fn base_headers() -> [(HeaderName, HeaderValue); 6] {
    [
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            PERMISSIONS_POLICY,
            HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
        ),
        (
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ),
    ]
}

fn forwarded_https(request: &Request<Body>) -> bool {
    request
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let secure = state.config.listener.tls.is_some() || forwarded_https(&request);
    let hsts = secure && state.config.security.hsts_enabled;

    let mut response = next.run(request).await;

    for (name, value) in base_headers() {
        response.headers_mut().insert(name, value);
    }
    if hsts {
        response.headers_mut().insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(STRICT_TRANSPORT_SECURITY),
        );
    }

    response
}
