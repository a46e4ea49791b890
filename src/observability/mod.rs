//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!     → query_log.rs (per-request persistence-call accumulator)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//!     → Diagnostic warnings (query observer middleware)
//! ```
//!
//! # Design Decisions
//! - Structured logging throughout; the correlation ID flows through spans
//! - Metrics are cheap (atomic increments)
//! - Query observation only runs in diagnostic mode to avoid overhead

pub mod logging;
pub mod metrics;
pub mod query_log;

pub use query_log::{QueryEntry, QueryLog};
