//! Bearer token issuance and verification (HS256 JWT)
//!
//! The claim carries only the username. Identity details are re-resolved on
//! every request and never trusted from the token.

use crate::{config::SecurityConfig, error::AppError, models::user::Identity};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaim {
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Why a token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed or its signature does not match")]
    Invalid,
    #[error("token has expired")]
    Expired,
}

/// Signs and verifies bearer tokens with a process-wide secret
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenCodec {
    /// Create the codec from security config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let secret = config.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        let lifetime = i64::try_from(config.access_token_exp_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| AppError::Config("access token lifetime out of range".to_string()))?;

        Ok(Self::new(secret.as_bytes(), lifetime))
    }

    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    /// Issue a token for `identity`, valid from now
    pub fn issue(&self, identity: &Identity) -> Result<String, AppError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if it had been signed at `issued_at`
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expires_at = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AppError::internal_error("Access token expiry overflows"))?;

        let claim = TokenClaim {
            username: identity.username.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claim, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AppError::internal_error(format!("Failed to encode access token: {}", e))
        })
    }

    /// Verify signature and expiry, returning the claim
    pub fn decode(&self, token: &str) -> Result<TokenClaim, TokenError> {
        let claim = decode::<TokenClaim>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => {
                    tracing::debug!("Token validation failed: {:?}", e);
                    TokenError::Invalid
                }
            })?
            .claims;

        // jsonwebtoken only rejects exp < now; a token is already dead at exp
        if claim.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claim)
    }
}
