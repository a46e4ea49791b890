//! API-key storage.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage I/O failed.
    #[error("key store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded.
    #[error("key store corrupt: {0}")]
    Corrupt(String),
}

/// The authenticated identity resolved from a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable account identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Subscription plan the account is on.
    pub plan: String,
}

impl Principal {
    pub fn new(id: impl Into<String>, name: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plan: plan.into(),
        }
    }
}

/// A stored API key and its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    /// Owning account.
    pub principal: Principal,

    /// Explicit kill switch; an inactive key never authenticates.
    pub active: bool,

    /// Start of the validity window (seconds since epoch).
    pub valid_from: u64,

    /// End of the validity window, exclusive. `None` means no expiry.
    pub valid_until: Option<u64>,

    /// Last successful authentication (seconds since epoch).
    #[serde(default)]
    pub last_used: Option<u64>,
}

impl ApiKeyRecord {
    pub fn new(principal: Principal, valid_from: u64, valid_until: Option<u64>) -> Self {
        Self {
            principal,
            active: true,
            valid_from,
            valid_until,
            last_used: None,
        }
    }

    /// Whether the key authenticates at the given instant.
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.active
            && now >= self.valid_from
            && self.valid_until.map_or(true, |until| now < until)
    }
}

/// Capability interface for credential lookup, injected into the pipeline.
pub trait CredentialStore: Send + Sync {
    /// Look up a key by its token. `Ok(None)` means unknown token.
    fn find_key(&self, token: &str) -> Result<Option<ApiKeyRecord>, StoreError>;

    /// Record a successful authentication. Last-write-wins; never fails.
    fn mark_used(&self, token: &str, now: u64);
}

/// A thread-safe in-memory key store with optional JSON persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeyStore {
    inner: Arc<DashMap<String, ApiKeyRecord>>,
    persistence_path: Option<String>,
}

impl MemoryKeyStore {
    /// Create a new empty store.
    pub fn new(persistence_path: Option<String>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
        }
    }

    /// Load from file if it exists.
    pub fn load_from_file(path: &str) -> Result<Self, StoreError> {
        let store = Self::new(Some(path.to_string()));
        if Path::new(path).exists() {
            let file = File::open(path)?;
            let reader = BufReader::new(file);
            let map: std::collections::HashMap<String, ApiKeyRecord> =
                serde_json::from_reader(reader).map_err(|e| StoreError::Corrupt(e.to_string()))?;

            for (token, record) in map {
                store.inner.insert(token, record);
            }
            tracing::info!(keys = store.inner.len(), "Loaded API keys from file");
        }
        Ok(store)
    }

    /// Save to file.
    pub fn save_to_file(&self) -> Result<(), StoreError> {
        if let Some(path) = &self.persistence_path {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);

            let map: std::collections::HashMap<_, _> = self
                .inner
                .iter()
                .map(|r| (r.key().clone(), r.value().clone()))
                .collect();

            serde_json::to_writer(writer, &map).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            tracing::info!(keys = map.len(), "Saved API keys to file");
        }
        Ok(())
    }

    /// Insert or replace a key.
    pub fn insert_key(&self, token: impl Into<String>, record: ApiKeyRecord) {
        self.inner.insert(token.into(), record);
    }

    /// Number of stored keys.
    pub fn count(&self) -> usize {
        self.inner.len()
    }
}

impl CredentialStore for MemoryKeyStore {
    fn find_key(&self, token: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        Ok(self.inner.get(token).map(|r| r.value().clone()))
    }

    fn mark_used(&self, token: &str, now: u64) {
        if let Some(mut record) = self.inner.get_mut(token) {
            record.last_used = Some(now);
        }
    }
}
