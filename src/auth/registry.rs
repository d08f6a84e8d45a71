//! Route policy table
//!
//! Every route's visibility and role requirement is data registered once at
//! startup. Lookups of unregistered routes fail closed.

use crate::models::user::{Identity, Role};
use axum::http::Method;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// `"<METHOD> <path template>"`, e.g. `GET /users/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteId(String);

impl RouteId {
    pub fn new(method: &Method, path: &str) -> Self {
        Self(format!("{} {}", method.as_str(), path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub route_id: RouteId,
    pub visibility: Visibility,
    /// Empty means any authenticated identity
    pub required_roles: HashSet<Role>,
}

impl RouteDescriptor {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether `identity` satisfies at least one required role
    pub fn permits(&self, identity: &Identity) -> bool {
        self.required_roles.is_empty()
            || self.required_roles.iter().any(|role| identity.has_role(*role))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("route registered twice: {0}")]
    Duplicate(RouteId),
}

pub struct RouteRegistry {
    routes: HashMap<RouteId, RouteDescriptor>,
    fallback: RouteDescriptor,
}

impl RouteRegistry {
    pub fn builder() -> RouteRegistryBuilder {
        RouteRegistryBuilder::default()
    }

    /// Policy for `route_id`; unknown routes get protected with no roles
    pub fn resolve(&self, route_id: &RouteId) -> &RouteDescriptor {
        self.routes.get(route_id).unwrap_or(&self.fallback)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.values()
    }
}

#[derive(Default)]
pub struct RouteRegistryBuilder {
    entries: Vec<RouteDescriptor>,
}

impl RouteRegistryBuilder {
    /// Reachable without a token
    pub fn public(mut self, method: Method, path: &str) -> Self {
        self.entries.push(RouteDescriptor {
            route_id: RouteId::new(&method, path),
            visibility: Visibility::Public,
            required_roles: HashSet::new(),
        });
        self
    }

    /// Requires a valid token and, if `roles` is non-empty, one of `roles`
    pub fn protected(
        mut self,
        method: Method,
        path: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        self.entries.push(RouteDescriptor {
            route_id: RouteId::new(&method, path),
            visibility: Visibility::Protected,
            required_roles: roles.into_iter().collect(),
        });
        self
    }

    pub fn build(self) -> Result<RouteRegistry, RegistryError> {
        let mut routes = HashMap::with_capacity(self.entries.len());

        for descriptor in self.entries {
            let route_id = descriptor.route_id.clone();
            if routes.insert(route_id.clone(), descriptor).is_some() {
                return Err(RegistryError::Duplicate(route_id));
            }
        }

        Ok(RouteRegistry {
            routes,
            fallback: RouteDescriptor {
                route_id: RouteId("<unregistered>".to_string()),
                visibility: Visibility::Protected,
                required_roles: HashSet::new(),
            },
        })
    }
}
