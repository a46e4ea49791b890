//! Arcana — numerology & astrology content API backend.
//!
//! The interesting part of this crate is the request-lifecycle pipeline:
//! correlation IDs, API version negotiation, API-key authentication,
//! diagnostic query observation, security headers, and uniform error
//! envelopes, assembled as a linear middleware chain around thin content
//! handlers.

pub mod auth;
pub mod config;
pub mod http;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
