//! Password hashing and verification using Argon2id

use crate::error::AppError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Memory cost in KiB (19 MiB)
pub const MEMORY_COST_KIB: u32 = 19 * 1024;
/// Iterations
pub const TIME_COST: u32 = 2;
/// Lanes
pub const PARALLELISM: u32 = 1;

/// Salted one-way password hasher.
///
/// Cost parameters are compile-time constants; they keep a single
/// verification well under 100ms on commodity hardware.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new() -> Self {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .unwrap_or_default();

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a password into a PHC string; every call uses a fresh salt
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::internal_error(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored hash.
    ///
    /// A malformed stored hash is treated as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
