//! API-key authentication middleware.
//!
//! Resolves the caller identity before any handler runs. Requests without a
//! credential continue as anonymous; handlers decide whether that is
//! acceptable. Rejected credentials short-circuit with a 401 envelope.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{authenticate, epoch_secs, AuthOutcome, Identity};
use crate::http::error::ApiError;
use crate::http::server::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let outcome = authenticate(state.keys.as_ref(), request.headers(), epoch_secs());

    match outcome {
        AuthOutcome::Anonymous => {
            request.extensions_mut().insert(Identity::Anonymous);
            next.run(request).await
        }
        AuthOutcome::Authenticated(principal) => {
            tracing::debug!(principal = %principal.id, "Authenticated request");
            request.extensions_mut().insert(Identity::Principal(principal));
            next.run(request).await
        }
        AuthOutcome::Failed(reason) => {
            tracing::warn!(
                path = %request.uri().path(),
                reason = %reason,
                "Rejected credential"
            );
            ApiError::Authentication(reason.to_string()).into_response()
        }
    }
}
