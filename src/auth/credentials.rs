//! Credential verification over the user directory

use crate::{
    auth::password::PasswordHasher,
    error::AppError,
    models::user::Identity,
    repository::UserDirectory,
};
use once_cell::sync::OnceCell;
use secrecy::ExposeSecret;
use std::sync::Arc;
use thiserror::Error;

/// Hash verified against when the username is unknown, so both failure
/// paths pay for one Argon2 verification. Filled by the first verifier.
static DUMMY_HASH: OnceCell<String> = OnceCell::new();

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The username no longer resolves
    #[error("subject not found")]
    NotFound,

    /// Unknown user or wrong password; deliberately indistinguishable
    #[error("invalid credentials")]
    AuthFailed,

    #[error(transparent)]
    Directory(#[from] AppError),
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::NotFound => AppError::not_found("User not found"),
            CredentialError::AuthFailed => AppError::Unauthorized,
            CredentialError::Directory(inner) => inner,
        }
    }
}

pub struct CredentialVerifier {
    directory: Arc<dyn UserDirectory>,
    hasher: PasswordHasher,
    dummy_hash: &'static str,
}

impl CredentialVerifier {
    /// Computes the shared dummy hash up front so the first login miss
    /// costs the same as any other.
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        hasher: PasswordHasher,
    ) -> Result<Self, AppError> {
        let dummy_hash = DUMMY_HASH.get_or_try_init(|| hasher.hash("bazaar-timing-equalizer"))?;

        Ok(Self {
            directory,
            hasher,
            dummy_hash,
        })
    }

    /// Re-resolve an identity from a trusted token claim
    pub async fn validate_by_username(&self, username: &str) -> Result<Identity, CredentialError> {
        self.directory
            .find_by_username(username)
            .await?
            .ok_or(CredentialError::NotFound)
    }

    /// Check a login attempt; the returned identity carries no hash
    pub async fn validate_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, CredentialError> {
        let Some(record) = self.directory.find_by_username_with_hash(username).await? else {
            let _ = self.hasher.verify(password, self.dummy_hash);
            return Err(CredentialError::AuthFailed);
        };

        if !self.hasher.verify(password, record.password_hash.expose_secret()) {
            return Err(CredentialError::AuthFailed);
        }

        Ok(record.into_identity())
    }
}
