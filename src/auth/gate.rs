//! Per-request access decision
//!
//! route lookup → public bypass → bearer token → claim → identity → role.
//! Each step runs at most once; the first failing step decides the denial.

use crate::{
    auth::{
        credentials::{CredentialError, CredentialVerifier},
        registry::{RouteId, RouteRegistry},
        token::TokenCodec,
    },
    error::AppError,
    models::user::Identity,
};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// `None` for public routes, where no token is inspected
    Allow(Option<Identity>),
    Deny(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Missing, malformed, invalid or expired token
    Unauthenticated,
    /// Token verified but its subject no longer exists
    NotFound,
    /// Authenticated without a required role
    Forbidden,
}

impl From<DenyReason> for AppError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::Unauthenticated => AppError::Unauthorized,
            DenyReason::NotFound => AppError::not_found("User not found"),
            DenyReason::Forbidden => AppError::Forbidden,
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
///
/// The scheme is matched case-insensitively; an empty token is rejected.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub struct AccessGate {
    registry: Arc<RouteRegistry>,
    tokens: Arc<TokenCodec>,
    credentials: Arc<CredentialVerifier>,
}

impl AccessGate {
    pub fn new(
        registry: Arc<RouteRegistry>,
        tokens: Arc<TokenCodec>,
        credentials: Arc<CredentialVerifier>,
    ) -> Self {
        Self {
            registry,
            tokens,
            credentials,
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Decide whether a request to `route_id` may proceed.
    ///
    /// `authorization` is the raw `Authorization` header value, if any.
    /// Only directory failures surface as `Err`.
    pub async fn decide(
        &self,
        route_id: &RouteId,
        authorization: Option<&str>,
    ) -> Result<Decision, AppError> {
        let route = self.registry.resolve(route_id);

        if route.is_public() {
            return Ok(Decision::Allow(None));
        }

        let Some(token) = authorization.and_then(parse_bearer) else {
            tracing::debug!(route = %route_id, "Missing or malformed bearer token");
            return Ok(Decision::Deny(DenyReason::Unauthenticated));
        };

        let claim = match self.tokens.decode(token) {
            Ok(claim) => claim,
            Err(e) => {
                tracing::debug!(route = %route_id, reason = %e, "Bearer token rejected");
                return Ok(Decision::Deny(DenyReason::Unauthenticated));
            }
        };

        let identity = match self.credentials.validate_by_username(&claim.username).await {
            Ok(identity) => identity,
            Err(CredentialError::NotFound) => {
                tracing::warn!(route = %route_id, "Token subject no longer exists");
                return Ok(Decision::Deny(DenyReason::NotFound));
            }
            Err(CredentialError::AuthFailed) => {
                return Ok(Decision::Deny(DenyReason::Unauthenticated));
            }
            Err(CredentialError::Directory(e)) => return Err(e),
        };

        if !route.permits(&identity) {
            tracing::warn!(
                route = %route_id,
                user_id = identity.id,
                required_roles = ?route.required_roles,
                "Insufficient role"
            );
            return Ok(Decision::Deny(DenyReason::Forbidden));
        }

        Ok(Decision::Allow(Some(identity)))
    }
}
