//! License verification and management for licensor.
//!
//! Two engines share one store handle:
//! - [`VerificationEngine`]: the client-facing check that accepts, rejects,
//!   or binds a license to a hardware fingerprint on first use
//! - [`ManagementEngine`]: operator actions (issue, inspect, toggle, unbind,
//!   list, delete)
//!
//! # Binding Protocol
//!
//! A license starts unbound. The first successful verification records the
//! caller's hwid, and every later verification must present that same hwid.
//! Only an administrative `reset-hwid` returns the license to unbound.
//!
//! The binding write is a conditional update in the store, so concurrent
//! first verifications with different hwids produce exactly one activation.
//! The losers are rejected with [`LicenseError::HardwareMismatch`].

mod error;
mod manage;
mod response;
mod verify;

pub use error::{ErrorKind, LicenseError, LicenseResult};
pub use manage::{ManagementEngine, StateAction, StateChange};
pub use response::ApiResponse;
pub use verify::{VerificationEngine, VerifyOutcome};
