//! Authentication and authorization gate

pub mod credentials;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod registry;
pub mod token;

pub use credentials::{CredentialError, CredentialVerifier};
pub use gate::{parse_bearer, AccessGate, Decision, DenyReason};
pub use middleware::{access_gate_middleware, CurrentUser};
pub use password::PasswordHasher;
pub use registry::{RouteDescriptor, RouteId, RouteRegistry, Visibility};
pub use token::{TokenClaim, TokenCodec, TokenError};
