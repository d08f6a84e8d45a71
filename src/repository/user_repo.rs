//! User repository (PostgreSQL)

use super::{username_taken, UserDirectory, UserStore};
use crate::{
    error::AppError,
    models::user::{Identity, NewUser, UserChanges, UserRecord},
};
use async_trait::async_trait;
use secrecy::Secret;
use sqlx::PgPool;

/// Full row including the hash; never leaves this module as-is
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    is_admin: bool,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            identity: Identity {
                id: row.id,
                username: row.username,
                is_admin: row.is_admin,
            },
            password_hash: Secret::new(row.password_hash),
        }
    }
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Map a unique violation on `users.username` to a conflict
fn map_write_error(e: sqlx::Error, username: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => username_taken(username),
        _ => AppError::Database(e),
    }
}

#[async_trait]
impl UserDirectory for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Identity>, AppError> {
        let user = sqlx::query_as::<_, Identity>(
            "SELECT id, username, is_admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn find_by_username_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, is_admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(UserRecord::from))
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, AppError> {
        let user = sqlx::query_as::<_, Identity>(
            "SELECT id, username, is_admin FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<Identity>, AppError> {
        let users = sqlx::query_as::<_, Identity>(
            "SELECT id, username, is_admin FROM users ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    async fn create(&self, user: NewUser) -> Result<Identity, AppError> {
        sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO users (username, password_hash, is_admin)
            VALUES ($1, $2, $3)
            RETURNING id, username, is_admin
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, &user.username))
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<Option<Identity>, AppError> {
        let username = changes.username.clone().unwrap_or_default();

        sqlx::query_as::<_, Identity>(
            r#"
            UPDATE users
            SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                is_admin = COALESCE($4, is_admin),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, is_admin
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.password_hash)
        .bind(changes.is_admin)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_write_error(e, &username))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
