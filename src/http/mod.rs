//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, route registration)
//!     → middleware/ (request ID → security headers → error envelope
//!                    → version → auth → query observer)
//!     → handlers.rs (content endpoints)
//!     → response back out through the same stack
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;

pub use error::{ApiError, ApiResult, ErrorEnvelope};
pub use server::{AppState, HttpServer};
