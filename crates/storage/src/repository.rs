use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use tracker_core::model::{AccountId, ProblemId};

/// Errors surfaced by storage adapters.
///
/// `NotFound` is a distinct, expected condition — callers rely on being
/// able to tell it apart from a failed query.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of one remote progress row.
///
/// The row is always written whole (create-or-replace), never diffed
/// field-by-field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProgressRecord {
    pub account_id: AccountId,
    pub completed_problems: Vec<ProblemId>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new(
        account_id: AccountId,
        completed_problems: Vec<ProblemId>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            account_id,
            completed_problems,
            updated_at,
        }
    }
}

/// Device-scoped store for the anonymous completed set, addressed by a
/// fixed key.
#[async_trait]
pub trait LocalProgressStore: Send + Sync {
    /// Read the stored completed set.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet **or** when the
    /// stored value fails to deserialize — corrupt data reads as absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only for access failures, never for missing
    /// or malformed values.
    async fn load(&self) -> Result<Option<Vec<ProblemId>>, StorageError>;

    /// Overwrite the stored completed set with the full new value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn save(&self, ids: &[ProblemId]) -> Result<(), StorageError>;
}

/// Per-account remote row store with atomic create-or-replace semantics.
#[async_trait]
pub trait RemoteProgressStore: Send + Sync {
    /// Fetch the progress row for an account.
    ///
    /// Returns `Ok(None)` for a genuine not-found — a valid state for a
    /// newly authenticated account, distinct from a query failure.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query itself fails.
    async fn fetch(&self, account_id: AccountId) -> Result<Option<ProgressRecord>, StorageError>;

    /// Create or replace the full row for the record's account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    async fn upsert(&self, record: &ProgressRecord) -> Result<(), StorageError>;
}

/// In-memory local store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryLocalStore {
    value: Arc<Mutex<Option<Vec<ProblemId>>>>,
}

impl InMemoryLocalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-seeded completed set, as if a previous anonymous
    /// session had written it.
    #[must_use]
    pub fn seeded(ids: Vec<ProblemId>) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(ids))),
        }
    }
}

#[async_trait]
impl LocalProgressStore for InMemoryLocalStore {
    async fn load(&self) -> Result<Option<Vec<ProblemId>>, StorageError> {
        let guard = self
            .value
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(&self, ids: &[ProblemId]) -> Result<(), StorageError> {
        let mut guard = self
            .value
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(ids.to_vec());
        Ok(())
    }
}

/// In-memory remote store for tests, with injectable failure to exercise
/// degraded-read paths.
#[derive(Clone, Default)]
pub struct InMemoryRemoteStore {
    records: Arc<Mutex<HashMap<AccountId, ProgressRecord>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every fetch and upsert fails with a connection error.
    pub fn set_failing(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    /// When set, fetches succeed but upserts fail.
    pub fn set_failing_writes(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of the stored row for an account, for assertions.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn record(&self, account_id: AccountId) -> Option<ProgressRecord> {
        self.records.lock().unwrap().get(&account_id).cloned()
    }

    fn check(flag: &AtomicBool) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteProgressStore for InMemoryRemoteStore {
    async fn fetch(&self, account_id: AccountId) -> Result<Option<ProgressRecord>, StorageError> {
        Self::check(&self.fail_reads)?;
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&account_id).cloned())
    }

    async fn upsert(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        Self::check(&self.fail_writes)?;
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.account_id, record.clone());
        Ok(())
    }
}

/// Aggregates the two progress homes behind trait objects for easy
/// backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub local: Arc<dyn LocalProgressStore>,
    pub remote: Arc<dyn RemoteProgressStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            local: Arc::new(InMemoryLocalStore::new()),
            remote: Arc::new(InMemoryRemoteStore::new()),
        }
    }
}
