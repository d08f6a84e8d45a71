//! 用户管理的 HTTP 处理器
//!
//! 角色检查由访问网关完成，这里只负责业务本身。

use crate::{
    auth::CurrentUser,
    error::AppError,
    middleware::AppState,
    models::user::{CreateUserRequest, NewUser, UpdateUserRequest, UserChanges},
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

fn user_not_found(id: i64) -> AppError {
    AppError::not_found(format!("User with id {} not found", id))
}

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

/// 创建用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let password_hash = state.hasher.hash(&req.password)?;
    let user = state
        .users
        .create(NewUser {
            username: req.username,
            password_hash,
            is_admin: req.is_admin,
        })
        .await?;

    tracing::info!(actor_id = actor.id, user_id = user.id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| user_not_found(id))?;

    Ok(Json(user))
}

/// 更新用户
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    let password_hash = req
        .password
        .as_deref()
        .map(|password| state.hasher.hash(password))
        .transpose()?;

    let user = state
        .users
        .update(
            id,
            UserChanges {
                username: req.username,
                password_hash,
                is_admin: req.is_admin,
            },
        )
        .await?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(actor_id = actor.id, user_id = id, "User updated");

    Ok(Json(user))
}

/// 删除用户
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    if !state.users.delete(id).await? {
        return Err(user_not_found(id));
    }

    tracing::info!(actor_id = actor.id, user_id = id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
