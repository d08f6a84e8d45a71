//! User domain models

use secrecy::Secret;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Authenticated identity as seen by the gate and by API callers.
///
/// Never carries credential material, so it is safe to serialize as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub is_admin: bool,
}

impl Identity {
    /// Whether this identity holds `role`
    pub fn has_role(&self, role: Role) -> bool {
        match role {
            Role::Admin => self.is_admin,
        }
    }
}

/// Stored user together with its password hash.
///
/// Only the directory builds this and only the credential verifier opens the
/// hash. Not `Serialize`; `Debug` redacts the hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub identity: Identity,
    pub password_hash: Secret<String>,
}

impl UserRecord {
    /// Drop the hash, keeping only the public identity
    pub fn into_identity(self) -> Identity {
        self.identity
    }
}

/// Roles a route may require.
///
/// There is a single role today, derived from the `is_admin` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "username should not be empty"))]
    pub username: String,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Update user request; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "username should not be empty"))]
    pub username: Option<String>,
    #[validate(length(min = 1, message = "password should not be empty"))]
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

/// New user as handed to a store: the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Field changes as handed to a store
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub is_admin: Option<bool>,
}
