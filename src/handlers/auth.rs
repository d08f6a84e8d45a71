//! 认证相关的 HTTP 处理器

use crate::{error::AppError, middleware::AppState, models::auth::LoginRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    req.validate()?;

    let response = state.auth_service.login(&req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}
