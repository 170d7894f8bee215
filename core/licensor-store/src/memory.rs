//! In-memory store.

use crate::error::{StoreError, StoreResult};
use crate::record::{AdminRecord, FieldUpdate, LicenseRecord};
use crate::{AdminStore, LicenseStore};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    /// Records keyed by license key, tagged with their insertion sequence.
    licenses: HashMap<String, (u64, LicenseRecord)>,
    admins: Vec<AdminRecord>,
    next_seq: u64,
}

/// A [`LicenseStore`] and [`AdminStore`] held entirely in memory.
///
/// Every operation takes a single lock, so each call is atomic with respect
/// to every other call.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl LicenseStore for MemoryStore {
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseRecord>> {
        Ok(self.inner()?.licenses.get(key).map(|(_, r)| r.clone()))
    }

    fn find_by_key_and_server(
        &self,
        key: &str,
        server_id: &str,
    ) -> StoreResult<Option<LicenseRecord>> {
        Ok(self
            .inner()?
            .licenses
            .get(key)
            .filter(|(_, r)| r.server_id == server_id)
            .map(|(_, r)| r.clone()))
    }

    fn insert(&self, record: &LicenseRecord) -> StoreResult<()> {
        let mut inner = self.inner()?;
        if inner.licenses.contains_key(&record.key) {
            return Err(StoreError::Duplicate(record.key.clone()));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .licenses
            .insert(record.key.clone(), (seq, record.clone()));
        Ok(())
    }

    fn compare_and_set_hwid(&self, key: &str, hwid: &str) -> StoreResult<bool> {
        let mut inner = self.inner()?;
        match inner.licenses.get_mut(key) {
            Some((_, record)) if record.hwid.is_none() => {
                record.hwid = Some(hwid.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn update_field(&self, key: &str, update: FieldUpdate) -> StoreResult<()> {
        let mut inner = self.inner()?;
        let (_, record) = inner
            .licenses
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        match update {
            FieldUpdate::Active(active) => record.active = active,
            FieldUpdate::Hwid(hwid) => record.hwid = hwid,
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner()?
            .licenses
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn list_all(&self) -> StoreResult<Vec<LicenseRecord>> {
        let inner = self.inner()?;
        let mut entries: Vec<_> = inner.licenses.values().collect();
        entries.sort_by_key(|(seq, r)| Reverse((r.created_at, *seq)));
        Ok(entries.into_iter().map(|(_, r)| r.clone()).collect())
    }
}

impl AdminStore for MemoryStore {
    fn insert_first_admin(&self, admin: &AdminRecord) -> StoreResult<bool> {
        let mut inner = self.inner()?;
        if !inner.admins.is_empty() {
            return Ok(false);
        }
        inner.admins.push(admin.clone());
        Ok(true)
    }

    fn find_admin(&self, username: &str) -> StoreResult<Option<AdminRecord>> {
        Ok(self
            .inner()?
            .admins
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }
}
