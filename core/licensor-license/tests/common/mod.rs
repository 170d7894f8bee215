//! Shared test helpers for engine tests.

#![allow(dead_code)]

use licensor_license::{ManagementEngine, VerificationEngine};
use licensor_store::{
    FieldUpdate, LicenseRecord, LicenseStore, MemoryStore, SqliteStore, StoreError, StoreResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};

/// Both engines over one fresh in-memory store.
pub fn engines() -> (VerificationEngine, ManagementEngine, Arc<dyn LicenseStore>) {
    engines_over(Arc::new(MemoryStore::new()))
}

/// Both engines over one fresh in-memory SQLite database.
pub fn sqlite_engines() -> (VerificationEngine, ManagementEngine, Arc<dyn LicenseStore>) {
    engines_over(Arc::new(SqliteStore::open_in_memory().unwrap()))
}

pub fn engines_over(
    store: Arc<dyn LicenseStore>,
) -> (VerificationEngine, ManagementEngine, Arc<dyn LicenseStore>) {
    (
        VerificationEngine::new(Arc::clone(&store)),
        ManagementEngine::new(Arc::clone(&store)),
        store,
    )
}

/// Holds the first `gated` key lookups at a barrier so that every racer
/// reads the record before any of them writes.
pub struct GatedStore {
    inner: MemoryStore,
    barrier: Barrier,
    gated: usize,
    lookups: AtomicUsize,
}

impl GatedStore {
    pub fn new(gated: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            barrier: Barrier::new(gated),
            gated,
            lookups: AtomicUsize::new(0),
        }
    }
}

impl LicenseStore for GatedStore {
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseRecord>> {
        let record = self.inner.find_by_key(key)?;
        if self.lookups.fetch_add(1, Ordering::SeqCst) < self.gated {
            self.barrier.wait();
        }
        Ok(record)
    }

    fn find_by_key_and_server(
        &self,
        key: &str,
        server_id: &str,
    ) -> StoreResult<Option<LicenseRecord>> {
        self.inner.find_by_key_and_server(key, server_id)
    }

    fn insert(&self, record: &LicenseRecord) -> StoreResult<()> {
        self.inner.insert(record)
    }

    fn compare_and_set_hwid(&self, key: &str, hwid: &str) -> StoreResult<bool> {
        self.inner.compare_and_set_hwid(key, hwid)
    }

    fn update_field(&self, key: &str, update: FieldUpdate) -> StoreResult<()> {
        self.inner.update_field(key, update)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.delete(key)
    }

    fn list_all(&self) -> StoreResult<Vec<LicenseRecord>> {
        self.inner.list_all()
    }
}

/// A store whose every call fails.
pub struct BrokenStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("database offline".to_string()))
}

impl LicenseStore for BrokenStore {
    fn find_by_key(&self, _: &str) -> StoreResult<Option<LicenseRecord>> {
        down()
    }
    fn find_by_key_and_server(&self, _: &str, _: &str) -> StoreResult<Option<LicenseRecord>> {
        down()
    }
    fn insert(&self, _: &LicenseRecord) -> StoreResult<()> {
        down()
    }
    fn compare_and_set_hwid(&self, _: &str, _: &str) -> StoreResult<bool> {
        down()
    }
    fn update_field(&self, _: &str, _: FieldUpdate) -> StoreResult<()> {
        down()
    }
    fn delete(&self, _: &str) -> StoreResult<()> {
        down()
    }
    fn list_all(&self) -> StoreResult<Vec<LicenseRecord>> {
        down()
    }
}

/// Fails only the binding write; reads go to a real store.
pub struct FailingBindStore {
    pub inner: MemoryStore,
}

impl LicenseStore for FailingBindStore {
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseRecord>> {
        self.inner.find_by_key(key)
    }
    fn find_by_key_and_server(&self, key: &str, server_id: &str) -> StoreResult<Option<LicenseRecord>> {
        self.inner.find_by_key_and_server(key, server_id)
    }
    fn insert(&self, record: &LicenseRecord) -> StoreResult<()> {
        self.inner.insert(record)
    }
    fn compare_and_set_hwid(&self, _: &str, _: &str) -> StoreResult<bool> {
        Err(StoreError::Unavailable("write timed out".to_string()))
    }
    fn update_field(&self, key: &str, update: FieldUpdate) -> StoreResult<()> {
        self.inner.update_field(key, update)
    }
    fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.delete(key)
    }
    fn list_all(&self) -> StoreResult<Vec<LicenseRecord>> {
        self.inner.list_all()
    }
}
