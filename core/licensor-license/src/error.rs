//! Error types for the licensing module.

use licensor_store::StoreError;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// One or more required request fields were empty.
    #[error("missing required fields: {0}")]
    MissingFields(String),

    /// Verification was attempted with a key that does not exist.
    #[error("invalid license key")]
    InvalidKey,

    /// Administrative lookup matched no record.
    #[error("license not found")]
    NotFound,

    /// A license with this key already exists.
    #[error("license key already exists: {0}")]
    Conflict(String),

    /// License is administratively disabled.
    #[error("license inactive")]
    Inactive,

    /// License is issued for a different server.
    #[error("license is assigned to a different server")]
    WrongServer,

    /// License is bound to a different hardware fingerprint.
    #[error("hardware id mismatch")]
    HardwareMismatch,

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of [`LicenseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller sent malformed input; the store was not touched.
    Validation,
    NotFound,
    Conflict,
    /// Business-rule rejection, not a system fault.
    State,
    StoreFailure,
}

impl LicenseError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingFields(_) => ErrorKind::Validation,
            Self::InvalidKey | Self::NotFound => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Inactive | Self::WrongServer | Self::HardwareMismatch => ErrorKind::State,
            Self::Store(_) => ErrorKind::StoreFailure,
        }
    }

    /// Fails with [`LicenseError::MissingFields`] naming every blank field.
    pub(crate) fn require(fields: &[(&str, &str)]) -> LicenseResult<()> {
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Self::MissingFields(missing.join(", ")))
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
