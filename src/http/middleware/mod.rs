//! Request-lifecycle middleware.
//!
//! # Pipeline order (outermost first)
//! ```text
//! request_id        → correlation ID in, span, ID + metrics out
//! security_headers  → fixed protective header set on every response
//! error_envelope    → uniform error shaping, 401 override, error logging
//! version           → API version negotiation, 400 short-circuit
//! auth              → API-key resolution, 401 short-circuit
//! query_observer    → diagnostic-mode query counting/timing (optional)
//! ```
//!
//! Stateless per request; shared state lives in `AppState`.

pub mod auth;
pub mod error_envelope;
pub mod query_observer;
pub mod request_id;
pub mod security_headers;
pub mod version;

pub use query_observer::QueryRecorder;
pub use request_id::{RequestId, X_REQUEST_ID};
pub use version::ApiVersion;
