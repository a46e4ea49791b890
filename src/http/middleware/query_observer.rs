//! Query/performance observation.
//!
//! In diagnostic mode every request gets its own `QueryLog`; handlers record
//! the persistence operations they perform through the `QueryRecorder`
//! extractor, and after the response is built this middleware warns on
//! requests that query too much or too slowly. The layer is not installed
//! outside diagnostic mode, so normal operation pays nothing. Observation
//! never changes response content or status.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};

use crate::observability::query_log::{
    truncate_description, QueryLog, MAX_QUERIES_PER_REQUEST, SLOW_QUERY,
};

pub async fn query_observer_middleware(mut request: Request<Body>, next: Next) -> Response {
    let log = Arc::new(QueryLog::default());
    request.extensions_mut().insert(log.clone());

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let count = log.count();
    if count > MAX_QUERIES_PER_REQUEST {
        tracing::warn!(
            path = %path,
            method = %method,
            query_count = count,
            "Request exceeded query count threshold"
        );
    }
    for entry in log.slow_entries() {
        tracing::warn!(
            path = %path,
            query = %truncate_description(&entry.description),
            duration_ms = entry.duration.as_millis() as u64,
            "Slow query"
        );
    }

    response
}

/// Handler-side recorder for persistence operations.
///
/// Extracts the request's `QueryLog` when diagnostic mode installed one;
/// otherwise every call is a no-op.
pub struct QueryRecorder(Option<Arc<QueryLog>>);

impl<S> FromRequestParts<S> for QueryRecorder
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(QueryRecorder(parts.extensions.get::<Arc<QueryLog>>().cloned()))
    }
}

impl QueryRecorder {
    pub fn record(&self, description: &str, duration: Duration) {
        if let Some(log) = &self.0 {
            log.record(description, duration);
        }
    }

    /// Run a persistence operation and record its duration.
    pub fn observe<T>(&self, description: &str, op: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = op();
        self.record(description, start.elapsed());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_without_log_is_noop() {
        let recorder = QueryRecorder(None);
        let value = recorder.observe("SELECT 1", || 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_recorder_feeds_log() {
        let log = Arc::new(QueryLog::default());
        let recorder = QueryRecorder(Some(log.clone()));

        recorder.observe("SELECT * FROM reports", || ());
        recorder.record("UPDATE reports SET state = 'ready'", Duration::from_millis(150));

        assert_eq!(log.count(), 2);
        assert_eq!(log.slow_entries().len(), 1);
    }
}
