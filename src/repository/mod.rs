//! Database repository layer
//!
//! The gate only sees [`UserDirectory`]. CRUD handlers use the wider
//! [`UserStore`] and [`ItemStore`].

pub mod item_repo;
pub mod memory;
pub mod user_repo;

pub use item_repo::PgItemStore;
pub use memory::{InMemoryItemStore, InMemoryUserStore};
pub use user_repo::PgUserStore;

use crate::{
    error::AppError,
    models::{
        item::{CreateItemRequest, Item, UpdateItemRequest},
        user::{Identity, NewUser, UserChanges, UserRecord},
    },
};
use async_trait::async_trait;

/// Username lookups consumed by credential verification
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Public identity only
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError>;

    /// Identity plus stored password hash
    async fn find_by_username_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, AppError>;
}

/// User persistence behind the admin endpoints
#[async_trait]
pub trait UserStore: UserDirectory {
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, AppError>;

    async fn list(&self) -> Result<Vec<Identity>, AppError>;

    /// Fails with [`AppError::Conflict`] when the username is taken
    async fn create(&self, user: NewUser) -> Result<Identity, AppError>;

    /// `Ok(None)` when no user has this id
    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<Identity>, AppError>;

    /// `Ok(false)` when no user has this id
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// Item persistence, including the item's listing, comments and tags
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// A listing needs a description on creation
    async fn create(&self, item: &CreateItemRequest) -> Result<Item, AppError>;

    /// `Ok(None)` when no item has this id
    async fn update(&self, id: i64, req: &UpdateItemRequest) -> Result<Option<Item>, AppError>;

    /// Removes the listing, comments and tag links with the item
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

pub(crate) fn username_taken(username: &str) -> AppError {
    AppError::Conflict(format!("Username '{}' is already taken", username))
}
