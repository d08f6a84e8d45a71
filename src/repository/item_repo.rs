//! Item repository (PostgreSQL)
//!
//! An item and its relations are written in one transaction. Listing and
//! comments cascade with the item; tags are shared rows linked through
//! `item_tags`.

use super::ItemStore;
use crate::{
    error::AppError,
    models::item::{
        distinct_tags, listing_description_required, Comment, CommentRequest, CreateItemRequest,
        Item, Listing, ListingRequest, Tag, TagRequest, UpdateItemRequest,
    },
};
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

pub struct PgItemStore {
    db: PgPool,
}

impl PgItemStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    name: String,
}

async fn load(conn: &mut PgConnection, id: i64) -> Result<Option<Item>, sqlx::Error> {
    let Some(row) = sqlx::query_as::<_, ItemRow>("SELECT id, name FROM items WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let listing = sqlx::query_as::<_, Listing>(
        "SELECT id, description, rating FROM listings WHERE item_id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let comments = sqlx::query_as::<_, Comment>(
        "SELECT id, content FROM comments WHERE item_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.content
        FROM tags t
        JOIN item_tags it ON it.tag_id = t.id
        WHERE it.item_id = $1
        ORDER BY t.id
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(Some(Item {
        id: row.id,
        name: row.name,
        listing,
        comments,
        tags,
    }))
}

async fn insert_listing(
    conn: &mut PgConnection,
    item_id: i64,
    listing: &ListingRequest,
) -> Result<(), AppError> {
    let description = listing
        .description
        .as_deref()
        .ok_or_else(listing_description_required)?;

    sqlx::query("INSERT INTO listings (item_id, description, rating) VALUES ($1, $2, $3)")
        .bind(item_id)
        .bind(description)
        .bind(listing.rating)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

async fn upsert_listing(
    conn: &mut PgConnection,
    item_id: i64,
    listing: &ListingRequest,
) -> Result<(), AppError> {
    let updated = sqlx::query(
        r#"
        UPDATE listings
        SET description = COALESCE($2, description),
            rating = COALESCE($3, rating)
        WHERE item_id = $1
        "#,
    )
    .bind(item_id)
    .bind(listing.description.as_deref())
    .bind(listing.rating)
    .execute(&mut *conn)
    .await?;

    if updated.rows_affected() == 0 {
        insert_listing(conn, item_id, listing).await?;
    }
    Ok(())
}

async fn insert_comments(
    conn: &mut PgConnection,
    item_id: i64,
    comments: &[CommentRequest],
) -> Result<(), sqlx::Error> {
    for comment in comments {
        sqlx::query("INSERT INTO comments (item_id, content) VALUES ($1, $2)")
            .bind(item_id)
            .bind(&comment.content)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Replace the item's comments; ids not owned by the item become new rows
async fn replace_comments(
    conn: &mut PgConnection,
    item_id: i64,
    comments: &[CommentRequest],
) -> Result<(), sqlx::Error> {
    let kept: Vec<i64> = comments.iter().filter_map(|c| c.id).collect();

    sqlx::query("DELETE FROM comments WHERE item_id = $1 AND id <> ALL($2)")
        .bind(item_id)
        .bind(&kept)
        .execute(&mut *conn)
        .await?;

    let mut fresh = Vec::new();
    for comment in comments {
        let updated = match comment.id {
            Some(id) => {
                sqlx::query("UPDATE comments SET content = $3 WHERE item_id = $1 AND id = $2")
                    .bind(item_id)
                    .bind(id)
                    .bind(&comment.content)
                    .execute(&mut *conn)
                    .await?
                    .rows_affected()
            }
            None => 0,
        };
        if updated == 0 {
            fresh.push(comment.clone());
        }
    }

    insert_comments(conn, item_id, &fresh).await
}

async fn link_tags(
    conn: &mut PgConnection,
    item_id: i64,
    tags: &[TagRequest],
) -> Result<(), sqlx::Error> {
    for content in distinct_tags(tags) {
        let (tag_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tags (content) VALUES ($1)
            ON CONFLICT (content) DO UPDATE SET content = EXCLUDED.content
            RETURNING id
            "#,
        )
        .bind(content)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO item_tags (item_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(item_id)
        .bind(tag_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn create(&self, req: &CreateItemRequest) -> Result<Item, AppError> {
        let mut tx = self.db.begin().await?;

        let (id,): (i64,) = sqlx::query_as("INSERT INTO items (name) VALUES ($1) RETURNING id")
            .bind(&req.name)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(listing) = &req.listing {
            insert_listing(&mut tx, id, listing).await?;
        }
        insert_comments(&mut tx, id, &req.comments).await?;
        link_tags(&mut tx, id, &req.tags).await?;

        let item = load(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::internal_error("Created item vanished"))?;
        tx.commit().await?;

        Ok(item)
    }

    async fn update(&self, id: i64, req: &UpdateItemRequest) -> Result<Option<Item>, AppError> {
        let mut tx = self.db.begin().await?;

        let found = sqlx::query(
            "UPDATE items SET name = COALESCE($2, name) WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(req.name.as_deref())
        .fetch_optional(&mut *tx)
        .await?;
        if found.is_none() {
            return Ok(None);
        }

        if let Some(listing) = &req.listing {
            upsert_listing(&mut tx, id, listing).await?;
        }
        if let Some(comments) = &req.comments {
            replace_comments(&mut tx, id, comments).await?;
        }
        if let Some(tags) = &req.tags {
            sqlx::query("DELETE FROM item_tags WHERE item_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_tags(&mut tx, id, tags).await?;
        }

        let item = load(&mut tx, id).await?;
        tx.commit().await?;

        Ok(item)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
