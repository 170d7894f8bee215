//! License verification and first-use hardware binding.
//!
//! Each check walks a fixed sequence and stops at the first failure:
//! key lookup, active flag, server id, then the hardware binding. A record
//! with no hwid is bound to the caller's hwid through the store's atomic
//! conditional write; every other path is read-only.

use crate::error::{LicenseError, LicenseResult};
use licensor_store::{LicenseRecord, LicenseStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A successful verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyOutcome {
    /// This call bound the license to the caller's hwid.
    Activated,
    /// The license was already bound to the caller's hwid.
    Valid,
}

impl VerifyOutcome {
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Activated => "license activated",
            Self::Valid => "license valid",
        }
    }
}

/// Client-facing license checks.
#[derive(Clone)]
pub struct VerificationEngine {
    store: Arc<dyn LicenseStore>,
}

impl VerificationEngine {
    pub fn new(store: Arc<dyn LicenseStore>) -> Self {
        Self { store }
    }

    /// Verifies `key` for `server_id` on the machine identified by `hwid`.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::MissingFields`] if any argument is blank
    /// - [`LicenseError::InvalidKey`] if no license has this key
    /// - [`LicenseError::Inactive`] if the license is disabled
    /// - [`LicenseError::WrongServer`] if the license belongs to another server
    /// - [`LicenseError::HardwareMismatch`] if the license is bound elsewhere
    /// - [`LicenseError::Store`] on storage failure
    pub fn verify(&self, key: &str, server_id: &str, hwid: &str) -> LicenseResult<VerifyOutcome> {
        LicenseError::require(&[("key", key), ("serverId", server_id), ("hwid", hwid)])?;

        let record = self
            .store
            .find_by_key(key)?
            .ok_or(LicenseError::InvalidKey)?;

        if !record.active {
            debug!(key, "verification rejected: inactive");
            return Err(LicenseError::Inactive);
        }
        if record.server_id != server_id {
            debug!(key, server_id, "verification rejected: wrong server");
            return Err(LicenseError::WrongServer);
        }

        if !record.is_bound() {
            if self.store.compare_and_set_hwid(key, hwid)? {
                info!(key, server_id, "license bound to hardware");
                return Ok(VerifyOutcome::Activated);
            }
            // Lost the binding race; judge against the winner's hwid.
            let current = self
                .store
                .find_by_key(key)?
                .ok_or(LicenseError::InvalidKey)?;
            return check_binding(&current, hwid);
        }

        check_binding(&record, hwid)
    }
}

fn check_binding(record: &LicenseRecord, hwid: &str) -> LicenseResult<VerifyOutcome> {
    match record.hwid.as_deref() {
        Some(bound) if bound == hwid => Ok(VerifyOutcome::Valid),
        _ => {
            debug!(key = %record.key, "verification rejected: hardware mismatch");
            Err(LicenseError::HardwareMismatch)
        }
    }
}
