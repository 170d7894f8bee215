//! Response envelope shared by every caller-facing operation.

use crate::error::{ErrorKind, LicenseError};
use serde::{Deserialize, Serialize};

/// `{ success, message, data? }`. `success == false` is the only failure
/// signal; `message` is for humans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok_with(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl<T> From<&LicenseError> for ApiResponse<T> {
    fn from(err: &LicenseError) -> Self {
        match err.kind() {
            // Storage details stay in the logs.
            ErrorKind::StoreFailure => Self::fail("internal server error"),
            _ => Self::fail(err.to_string()),
        }
    }
}

impl<T> From<LicenseError> for ApiResponse<T> {
    fn from(err: LicenseError) -> Self {
        Self::from(&err)
    }
}
