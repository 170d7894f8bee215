//! SQLite-backed store.

use crate::error::{StoreError, StoreResult};
use crate::record::{AdminRecord, FieldUpdate, LicenseRecord};
use crate::{AdminStore, LicenseStore};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// Default time a statement waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS licenses (
        key TEXT PRIMARY KEY NOT NULL,
        server_id TEXT NOT NULL,
        owner TEXT NOT NULL,
        hwid TEXT,
        active INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_licenses_created
        ON licenses(created_at DESC);

    CREATE TABLE IF NOT EXISTS admins (
        id TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );
"#;

const LICENSE_COLUMNS: &str = "key, server_id, owner, hwid, active, created_at";

/// License and admin storage in a single SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: &Path, busy_timeout: Duration) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        debug!("opened license database at {}", path.display());
        Self::with_connection(conn, busy_timeout)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, DEFAULT_BUSY_TIMEOUT)
    }

    fn with_connection(conn: Connection, busy_timeout: Duration) -> StoreResult<Self> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

/// Raw license row before timestamp decoding.
struct LicenseRow {
    key: String,
    server_id: String,
    owner: String,
    hwid: Option<String>,
    active: bool,
    created_at: i64,
}

impl LicenseRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            server_id: row.get(1)?,
            owner: row.get(2)?,
            hwid: row.get(3)?,
            active: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_record(self) -> StoreResult<LicenseRecord> {
        Ok(LicenseRecord {
            created_at: millis_to_datetime(self.created_at)?,
            key: self.key,
            server_id: self.server_id,
            owner: self.owner,
            hwid: self.hwid,
            active: self.active,
        })
    }
}

fn millis_to_datetime(ms: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::InvalidData(format!("timestamp out of range: {ms}")))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl LicenseStore for SqliteStore {
    fn find_by_key(&self, key: &str) -> StoreResult<Option<LicenseRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE key = ?1"),
                params![key],
                LicenseRow::from_row,
            )
            .optional()?;
        row.map(LicenseRow::into_record).transpose()
    }

    fn find_by_key_and_server(
        &self,
        key: &str,
        server_id: &str,
    ) -> StoreResult<Option<LicenseRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {LICENSE_COLUMNS} FROM licenses WHERE key = ?1 AND server_id = ?2"
                ),
                params![key, server_id],
                LicenseRow::from_row,
            )
            .optional()?;
        row.map(LicenseRow::into_record).transpose()
    }

    fn insert(&self, record: &LicenseRecord) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute(
            &format!("INSERT INTO licenses ({LICENSE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                record.key,
                record.server_id,
                record.owner,
                record.hwid,
                record.active,
                record.created_at.timestamp_millis(),
            ],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Duplicate(record.key.clone())
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    fn compare_and_set_hwid(&self, key: &str, hwid: &str) -> StoreResult<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE licenses SET hwid = ?2 WHERE key = ?1 AND hwid IS NULL",
            params![key, hwid],
        )?;
        Ok(changed == 1)
    }

    fn update_field(&self, key: &str, update: FieldUpdate) -> StoreResult<()> {
        let conn = self.conn()?;
        let changed = match update {
            FieldUpdate::Active(active) => conn.execute(
                "UPDATE licenses SET active = ?2 WHERE key = ?1",
                params![key, active],
            )?,
            FieldUpdate::Hwid(hwid) => conn.execute(
                "UPDATE licenses SET hwid = ?2 WHERE key = ?1",
                params![key, hwid],
            )?,
        };
        if changed == 0 {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM licenses WHERE key = ?1", params![key])?;
        if removed == 0 {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(())
    }

    fn list_all(&self) -> StoreResult<Vec<LicenseRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LICENSE_COLUMNS} FROM licenses ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
            .query_map([], LicenseRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(LicenseRow::into_record).collect()
    }
}

impl AdminStore for SqliteStore {
    fn insert_first_admin(&self, admin: &AdminRecord) -> StoreResult<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO admins (id, username, password_hash, created_at)
             SELECT ?1, ?2, ?3, ?4
             WHERE NOT EXISTS (SELECT 1 FROM admins)",
            params![
                admin.id.to_string(),
                admin.username,
                admin.password_hash,
                admin.created_at.timestamp_millis(),
            ],
        )?;
        Ok(inserted == 1)
    }

    fn find_admin(&self, username: &str) -> StoreResult<Option<AdminRecord>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, username, password_hash, created_at FROM admins WHERE username = ?1",
                params![username],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, username, password_hash, created_at)| {
            Ok(AdminRecord {
                id: Uuid::parse_str(&id)
                    .map_err(|e| StoreError::InvalidData(format!("admin id: {e}")))?,
                username,
                password_hash,
                created_at: millis_to_datetime(created_at)?,
            })
        })
        .transpose()
    }
}
