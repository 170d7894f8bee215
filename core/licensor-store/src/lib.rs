//! License record storage for licensor.
//!
//! Defines the store seams used by the verification and management engines:
//! - [`LicenseStore`]: keyed license records with an atomic first-binding write
//! - [`AdminStore`]: administrator accounts for the admin panel
//!
//! Two implementations are provided. [`SqliteStore`] persists to a SQLite
//! file and is what the server runs on; [`MemoryStore`] keeps everything in
//! a map and backs tests and throwaway runs.
//!
//! # Atomicity
//!
//! [`LicenseStore::compare_and_set_hwid`] is the only operation with a
//! cross-caller precondition. Implementations must check and write in one
//! step so that concurrent callers racing to bind the same license observe
//! exactly one winner.

mod error;
mod memory;
mod record;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use record::{AdminRecord, FieldUpdate, LicenseRecord};
pub use sqlite::SqliteStore;

/// Keyed collection of license records.
pub trait LicenseStore: Send + Sync {
    /// Looks up a record by key.
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseRecord>>;

    /// Looks up a record matching both key and server id.
    fn find_by_key_and_server(
        &self,
        key: &str,
        server_id: &str,
    ) -> StoreResult<Option<LicenseRecord>>;

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if a record with the same key exists.
    fn insert(&self, record: &LicenseRecord) -> StoreResult<()>;

    /// Sets `hwid` on the record only if it is currently unset.
    ///
    /// Returns `true` iff this call performed the transition. Returns `false`
    /// when the record is already bound or does not exist.
    fn compare_and_set_hwid(&self, key: &str, hwid: &str) -> StoreResult<bool>;

    /// Applies a single-field update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has this key.
    fn update_field(&self, key: &str, update: FieldUpdate) -> StoreResult<()>;

    /// Removes a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has this key.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Returns every record, newest `created_at` first.
    fn list_all(&self) -> StoreResult<Vec<LicenseRecord>>;
}

/// Administrator account storage.
pub trait AdminStore: Send + Sync {
    /// Inserts `admin` only if no administrator exists yet.
    ///
    /// Returns `false` when an administrator was already registered.
    fn insert_first_admin(&self, admin: &AdminRecord) -> StoreResult<bool>;

    /// Looks up an administrator by username.
    fn find_admin(&self, username: &str) -> StoreResult<Option<AdminRecord>>;
}
