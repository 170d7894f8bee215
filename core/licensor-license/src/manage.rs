//! Administrative license operations.
//!
//! These mutate records directly and bypass the binding protocol. Callers
//! are expected to have authenticated the operator already.

use crate::error::{LicenseError, LicenseResult};
use licensor_store::{FieldUpdate, LicenseRecord, LicenseStore, StoreError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Action requested through [`ManagementEngine::set_state`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateAction {
    Activate,
    Deactivate,
    ResetHwid,
    /// Anything else. Accepted and ignored.
    Unrecognized(String),
}

impl StateAction {
    #[must_use]
    pub fn parse(action: &str) -> Self {
        match action {
            "activate" => Self::Activate,
            "deactivate" => Self::Deactivate,
            "reset-hwid" => Self::ResetHwid,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    fn field_update(&self) -> Option<FieldUpdate> {
        match self {
            Self::Activate => Some(FieldUpdate::Active(true)),
            Self::Deactivate => Some(FieldUpdate::Active(false)),
            Self::ResetHwid => Some(FieldUpdate::Hwid(None)),
            Self::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for StateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activate => f.write_str("activate"),
            Self::Deactivate => f.write_str("deactivate"),
            Self::ResetHwid => f.write_str("reset-hwid"),
            Self::Unrecognized(other) => f.write_str(other),
        }
    }
}

/// Result of a successful [`ManagementEngine::set_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateChange {
    Applied,
    /// The action was not recognized and nothing was written.
    Ignored,
}

/// Operator-facing license administration.
#[derive(Clone)]
pub struct ManagementEngine {
    store: Arc<dyn LicenseStore>,
}

impl ManagementEngine {
    pub fn new(store: Arc<dyn LicenseStore>) -> Self {
        Self { store }
    }

    /// Issues a new active, unbound license.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::Conflict`] if the key is already taken.
    pub fn add(&self, key: &str, server_id: &str, owner: &str) -> LicenseResult<LicenseRecord> {
        LicenseError::require(&[("key", key), ("serverId", server_id), ("owner", owner)])?;

        let record = LicenseRecord::issue(key, server_id, owner);
        self.store.insert(&record).map_err(|e| match e {
            StoreError::Duplicate(key) => LicenseError::Conflict(key),
            other => other.into(),
        })?;

        info!(key, server_id, owner, "license added");
        Ok(record)
    }

    /// Returns the license matching both `key` and `server_id`.
    pub fn lookup(&self, key: &str, server_id: &str) -> LicenseResult<LicenseRecord> {
        LicenseError::require(&[("key", key), ("serverId", server_id)])?;

        self.store
            .find_by_key_and_server(key, server_id)?
            .ok_or(LicenseError::NotFound)
    }

    /// Applies `action` to the license.
    ///
    /// Unrecognized actions succeed with [`StateChange::Ignored`] as long as
    /// the key exists.
    pub fn set_state(&self, key: &str, action: &str) -> LicenseResult<StateChange> {
        LicenseError::require(&[("key", key), ("action", action)])?;

        if self.store.find_by_key(key)?.is_none() {
            return Err(LicenseError::NotFound);
        }

        let action = StateAction::parse(action);
        let Some(update) = action.field_update() else {
            warn!(key, %action, "ignoring unrecognized license action");
            return Ok(StateChange::Ignored);
        };

        self.store.update_field(key, update).map_err(not_found)?;
        info!(key, %action, "license updated");
        Ok(StateChange::Applied)
    }

    /// Lists all licenses, newest first.
    pub fn list(&self) -> LicenseResult<Vec<LicenseRecord>> {
        Ok(self.store.list_all()?)
    }

    /// Deletes the license.
    pub fn delete(&self, key: &str) -> LicenseResult<()> {
        LicenseError::require(&[("key", key)])?;

        self.store.delete(key).map_err(not_found)?;
        info!(key, "license deleted");
        Ok(())
    }
}

fn not_found(err: StoreError) -> LicenseError {
    match err {
        StoreError::NotFound(_) => LicenseError::NotFound,
        other => other.into(),
    }
}
