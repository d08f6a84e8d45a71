//! In-memory stores for tests and database-less local runs

use super::{username_taken, ItemStore, UserDirectory, UserStore};
use crate::{
    error::AppError,
    models::{
        item::{
            distinct_tags, listing_description_required, Comment, CommentRequest,
            CreateItemRequest, Item, Listing, ListingRequest, Tag, TagRequest, UpdateItemRequest,
        },
        user::{Identity, NewUser, UserChanges, UserRecord},
    },
};
use async_trait::async_trait;
use secrecy::Secret;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Clone)]
struct StoredUser {
    identity: Identity,
    password_hash: String,
}

#[derive(Default)]
struct UserTable {
    next_id: i64,
    rows: BTreeMap<i64, StoredUser>,
}

impl UserTable {
    fn by_username(&self, username: &str) -> Option<&StoredUser> {
        self.rows.values().find(|u| u.identity.username == username)
    }
}

/// Users kept in a map, ids assigned from 1 upwards
#[derive(Default)]
pub struct InMemoryUserStore {
    table: RwLock<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        let table = self.table.read().await;
        Ok(table.by_username(username).map(|u| u.identity.clone()))
    }

    async fn find_by_username_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let table = self.table.read().await;
        Ok(table.by_username(username).map(|u| UserRecord {
            identity: u.identity.clone(),
            password_hash: Secret::new(u.password_hash.clone()),
        }))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).map(|u| u.identity.clone()))
    }

    async fn list(&self) -> Result<Vec<Identity>, AppError> {
        let table = self.table.read().await;
        Ok(table.rows.values().map(|u| u.identity.clone()).collect())
    }

    async fn create(&self, user: NewUser) -> Result<Identity, AppError> {
        let mut table = self.table.write().await;

        if table.by_username(&user.username).is_some() {
            return Err(username_taken(&user.username));
        }

        table.next_id += 1;
        let identity = Identity {
            id: table.next_id,
            username: user.username,
            is_admin: user.is_admin,
        };
        table.rows.insert(
            identity.id,
            StoredUser {
                identity: identity.clone(),
                password_hash: user.password_hash,
            },
        );

        Ok(identity)
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<Identity>, AppError> {
        let mut table = self.table.write().await;

        if let Some(username) = &changes.username {
            if table
                .by_username(username)
                .is_some_and(|other| other.identity.id != id)
            {
                return Err(username_taken(username));
            }
        }

        let Some(stored) = table.rows.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(username) = changes.username {
            stored.identity.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            stored.password_hash = password_hash;
        }
        if let Some(is_admin) = changes.is_admin {
            stored.identity.is_admin = is_admin;
        }

        Ok(Some(stored.identity.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }
}

#[derive(Default)]
struct ItemTable {
    next_item_id: i64,
    next_listing_id: i64,
    next_comment_id: i64,
    next_tag_id: i64,
    rows: BTreeMap<i64, Item>,
    /// Shared tags keyed by content
    tags: BTreeMap<String, i64>,
}

impl ItemTable {
    fn tag(&mut self, content: &str) -> Tag {
        let id = match self.tags.get(content) {
            Some(id) => *id,
            None => {
                self.next_tag_id += 1;
                self.tags.insert(content.to_string(), self.next_tag_id);
                self.next_tag_id
            }
        };

        Tag {
            id,
            content: content.to_string(),
        }
    }

    fn tags(&mut self, requested: &[TagRequest]) -> Vec<Tag> {
        let mut tags: Vec<Tag> = distinct_tags(requested)
            .into_iter()
            .map(|content| self.tag(content))
            .collect();
        tags.sort_by_key(|t| t.id);
        tags
    }

    fn listing(
        &mut self,
        current: Option<Listing>,
        requested: &ListingRequest,
    ) -> Result<Listing, AppError> {
        match current {
            Some(mut listing) => {
                if let Some(description) = &requested.description {
                    listing.description = description.clone();
                }
                if requested.rating.is_some() {
                    listing.rating = requested.rating;
                }
                Ok(listing)
            }
            None => {
                let description = requested
                    .description
                    .clone()
                    .ok_or_else(listing_description_required)?;
                self.next_listing_id += 1;

                Ok(Listing {
                    id: self.next_listing_id,
                    description,
                    rating: requested.rating,
                })
            }
        }
    }

    fn comments(&mut self, current: &[Comment], requested: &[CommentRequest]) -> Vec<Comment> {
        let mut comments: Vec<Comment> = requested
            .iter()
            .map(|c| {
                let id = match c.id.filter(|id| current.iter().any(|old| old.id == *id)) {
                    Some(id) => id,
                    None => {
                        self.next_comment_id += 1;
                        self.next_comment_id
                    }
                };
                Comment {
                    id,
                    content: c.content.clone(),
                }
            })
            .collect();
        comments.sort_by_key(|c| c.id);
        comments
    }
}

#[derive(Default)]
pub struct InMemoryItemStore {
    table: RwLock<ItemTable>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn create(&self, req: &CreateItemRequest) -> Result<Item, AppError> {
        let mut table = self.table.write().await;

        let listing = req
            .listing
            .as_ref()
            .map(|listing| table.listing(None, listing))
            .transpose()?;
        let comments = table.comments(&[], &req.comments);
        let tags = table.tags(&req.tags);

        table.next_item_id += 1;
        let item = Item {
            id: table.next_item_id,
            name: req.name.clone(),
            listing,
            comments,
            tags,
        };
        table.rows.insert(item.id, item.clone());

        Ok(item)
    }

    async fn update(&self, id: i64, req: &UpdateItemRequest) -> Result<Option<Item>, AppError> {
        let mut table = self.table.write().await;

        // 在副本上修改，出错时原记录保持不变
        let Some(mut item) = table.rows.get(&id).cloned() else {
            return Ok(None);
        };

        if let Some(name) = &req.name {
            item.name = name.clone();
        }
        if let Some(listing) = &req.listing {
            item.listing = Some(table.listing(item.listing.take(), listing)?);
        }
        if let Some(comments) = &req.comments {
            item.comments = table.comments(&item.comments, comments);
        }
        if let Some(tags) = &req.tags {
            item.tags = table.tags(tags);
        }

        table.rows.insert(id, item.clone());
        Ok(Some(item))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }
}
