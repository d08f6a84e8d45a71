//! Authentication-related models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required and cannot be empty."))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required and cannot be empty."))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
}
