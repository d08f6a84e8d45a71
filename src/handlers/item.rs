//! 商品的 HTTP 处理器（公开路由）

use crate::{
    error::AppError,
    middleware::AppState,
    models::item::{CreateItemRequest, UpdateItemRequest},
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

fn item_not_found(id: i64) -> AppError {
    AppError::not_found(format!("Item with id {} not found", id))
}

/// 创建商品
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let item = state.items.create(&req).await?;
    tracing::debug!(item_id = item.id, "Item created");

    Ok((StatusCode::CREATED, Json(item)))
}

/// 更新商品
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    req.validate()?;

    let item = state
        .items
        .update(id, &req)
        .await?
        .ok_or_else(|| item_not_found(id))?;

    Ok(Json(item))
}

/// 删除商品
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    if !state.items.delete(id).await? {
        return Err(item_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}
