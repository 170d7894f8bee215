//! Administrator registration and credential checks.
//!
//! Passwords are stored as Argon2id PHC strings; the hash carries its own
//! salt and parameters, so verification works across parameter changes.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use licensor_store::{AdminRecord, AdminStore, StoreError};
use rand::RngCore;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Size of the password salt in bytes.
const SALT_SIZE: usize = 16;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing required fields: username, password")]
    MissingFields,

    /// Registration is closed once one administrator exists.
    #[error("admin already exists")]
    AlreadyRegistered,

    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Argon2id cost parameters for new password hashes.
#[derive(Clone, Debug)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // OWASP recommendations for Argon2id
        Self {
            memory_cost: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

pub struct AdminAuth {
    admins: Arc<dyn AdminStore>,
    params: KdfParams,
}

impl AdminAuth {
    pub fn new(admins: Arc<dyn AdminStore>, params: KdfParams) -> Self {
        Self { admins, params }
    }

    /// Registers the first administrator.
    pub fn register(&self, username: &str, password: &str) -> AuthResult<AdminRecord> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let admin = AdminRecord::new(username, self.hash_password(password)?);
        if !self.admins.insert_first_admin(&admin)? {
            return Err(AuthError::AlreadyRegistered);
        }

        info!(username, "admin registered");
        Ok(admin)
    }

    /// Checks a username/password pair.
    pub fn authenticate(&self, username: &str, password: &str) -> AuthResult<AdminRecord> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let admin = self
            .admins
            .find_admin(username)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &admin.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(admin)
    }

    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            None,
        )
        .map_err(|e| AuthError::Hash(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut salt_bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Hash(e.to_string()))?;

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
