//! Item domain models
//!
//! An item owns at most one listing and any number of comments; tags are
//! shared between items and matched by content.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub listing: Option<Listing>,
    pub comments: Vec<Comment>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub description: String,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub content: String,
}

/// Listing body; on update absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListingRequest {
    #[validate(length(min = 1, message = "listing description should not be empty"))]
    pub description: Option<String>,
    pub rating: Option<f64>,
}

/// A comment; `id` refers to an existing comment of the same item
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentRequest {
    pub id: Option<i64>,
    #[validate(length(min = 1, message = "comment content should not be empty"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TagRequest {
    #[validate(length(min = 1, message = "tag content should not be empty"))]
    pub content: String,
}

/// Create item request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: String,
    #[validate(nested)]
    pub listing: Option<ListingRequest>,
    #[serde(default)]
    #[validate(nested)]
    pub comments: Vec<CommentRequest>,
    #[serde(default)]
    #[validate(nested)]
    pub tags: Vec<TagRequest>,
}

/// Update item request.
///
/// `comments` and `tags`, when present, replace the item's current set.
/// Comments left out of the new set are deleted.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: Option<String>,
    #[validate(nested)]
    pub listing: Option<ListingRequest>,
    #[validate(nested)]
    pub comments: Option<Vec<CommentRequest>>,
    #[validate(nested)]
    pub tags: Option<Vec<TagRequest>>,
}

pub(crate) fn listing_description_required() -> crate::error::AppError {
    crate::error::AppError::BadRequest("listing description should not be empty".to_string())
}

/// Tag contents with duplicates removed, first occurrence kept
pub(crate) fn distinct_tags(tags: &[TagRequest]) -> Vec<&str> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        if !seen.contains(&tag.content.as_str()) {
            seen.push(tag.content.as_str());
        }
    }
    seen
}
