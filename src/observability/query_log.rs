//! Per-request query accumulator.
//!
//! Each request owns its own `QueryLog`; it is never shared across requests.
//! Handlers and repositories record the persistence operations they perform
//! while producing the response, and the query observer middleware reads the
//! totals after the response is built.

use std::sync::Mutex;
use std::time::Duration;

/// Warn when a single request performs more queries than this.
pub const MAX_QUERIES_PER_REQUEST: usize = 20;

/// Warn for any single query slower than this.
pub const SLOW_QUERY: Duration = Duration::from_millis(100);

/// Query descriptions are truncated to this many characters in warnings.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// One recorded persistence operation.
#[derive(Debug, Clone)]
pub struct QueryEntry {
    pub description: String,
    pub duration: Duration,
}

/// Accumulator for the persistence operations of a single request.
#[derive(Debug, Default)]
pub struct QueryLog {
    entries: Mutex<Vec<QueryEntry>>,
}

impl QueryLog {
    pub fn record(&self, description: impl Into<String>, duration: Duration) {
        let entry = QueryEntry {
            description: description.into(),
            duration,
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    pub fn count(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn entries(&self) -> Vec<QueryEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Entries strictly over the slow-query threshold.
    pub fn slow_entries(&self) -> Vec<QueryEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.duration > SLOW_QUERY)
            .collect()
    }
}

/// Truncate a query description for log output, respecting char boundaries.
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_LEN {
        description.to_string()
    } else {
        let mut out: String = description.chars().take(MAX_DESCRIPTION_LEN).collect();
        out.push('…');
        out
    }
}
