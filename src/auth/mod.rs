//! API-key authentication.
//!
//! # Data Flow
//! ```text
//! X-API-Key / Authorization header
//!     → extract_token (strip Bearer/ApiKey scheme prefix)
//!     → CredentialStore lookup
//!     → AuthOutcome (principal, anonymous, or failure)
//! ```
//!
//! # Design Decisions
//! - Authentication is a value (`AuthOutcome`), not an exception; the
//!   pipeline consumes it explicitly
//! - The store is an injected capability, never module-level state
//! - `mark_used` is best-effort and must never fail the request

pub mod store;

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap};
use thiserror::Error;

pub use store::{ApiKeyRecord, CredentialStore, MemoryKeyStore, Principal, StoreError};

/// Header carrying the API key (preferred over Authorization).
pub const X_API_KEY: &str = "x-api-key";

/// Scheme name advertised in WWW-Authenticate challenges.
pub const CHALLENGE_SCHEME: &str = "X-API-Key";

/// Why a presented credential was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Token not found among known keys.
    #[error("invalid API key")]
    UnknownKey,

    /// Token found but outside its validity window or deactivated.
    #[error("API key expired or inactive")]
    ExpiredKey,

    /// Store fault during lookup, re-signaled as an authentication error.
    #[error("authentication failed: {0}")]
    Internal(String),
}

/// Result of resolving a request's credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A valid, active key mapped to its owning principal.
    Authenticated(Principal),
    /// No credential presented; downstream authorization decides.
    Anonymous,
    /// A credential was presented and rejected.
    Failed(AuthError),
}

/// Caller identity attached to request extensions for handlers.
#[derive(Debug, Clone)]
pub enum Identity {
    Principal(Principal),
    Anonymous,
}

impl Identity {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Identity::Principal(p) => Some(p),
            Identity::Anonymous => None,
        }
    }
}

/// Current time as seconds since the epoch.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Pull a credential token out of the request headers.
///
/// Checks `X-API-Key` first, then `Authorization`. An optional `Bearer ` or
/// `ApiKey ` scheme prefix is stripped before lookup.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get(X_API_KEY)
        .or_else(|| headers.get(header::AUTHORIZATION))?
        .to_str()
        .ok()?;

    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("ApiKey "))
        .unwrap_or(raw)
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Resolve the caller identity from the presented credential, if any.
///
/// Store faults never escape this path; they are wrapped as a generic
/// authentication failure carrying the fault's message.
pub fn authenticate(store: &dyn CredentialStore, headers: &HeaderMap, now: u64) -> AuthOutcome {
    let token = match extract_token(headers) {
        Some(token) => token,
        None => return AuthOutcome::Anonymous,
    };

    let record = match store.find_key(&token) {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(error = %e, "Credential store lookup failed");
            return AuthOutcome::Failed(AuthError::Internal(e.to_string()));
        }
    };

    match record {
        None => AuthOutcome::Failed(AuthError::UnknownKey),
        Some(record) if !record.is_valid_at(now) => AuthOutcome::Failed(AuthError::ExpiredKey),
        Some(record) => {
            store.mark_used(&token, now);
            AuthOutcome::Authenticated(record.principal)
        }
    }
}
