//! Persisted record types.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A license and its binding state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    /// Opaque license key, unique across the store.
    pub key: String,
    /// Deployment the license is issued for.
    pub server_id: String,
    /// Free-form owner description.
    pub owner: String,
    /// Hardware fingerprint, `None` until the first successful verification.
    pub hwid: Option<String>,
    /// Administrative gate.
    pub active: bool,
    /// Creation time, never updated.
    pub created_at: DateTime<Utc>,
}

impl LicenseRecord {
    /// Creates an inactive, unbound record stamped with the current time.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        server_id: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            server_id: server_id.into(),
            owner: owner.into(),
            hwid: None,
            active: false,
            created_at: now_millis(),
        }
    }

    /// Creates an active, unbound record ready for its first verification.
    #[must_use]
    pub fn issue(
        key: impl Into<String>,
        server_id: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            active: true,
            ..Self::new(key, server_id, owner)
        }
    }

    /// Returns true once a hardware fingerprint has been recorded.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.hwid.is_some()
    }
}

/// A single-field mutation applied by administrative actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Set the `active` flag.
    Active(bool),
    /// Overwrite the hardware binding; `None` unbinds.
    Hwid(Option<String>),
}

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub id: Uuid,
    pub username: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl AdminRecord {
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            password_hash: password_hash.into(),
            created_at: now_millis(),
        }
    }
}

/// Current time at the millisecond precision the stores persist.
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
