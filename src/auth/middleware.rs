//! 访问控制中间件

use crate::{
    auth::{
        gate::{AccessGate, Decision},
        registry::RouteId,
    },
    error::AppError,
    models::user::Identity,
};
use axum::{
    extract::{FromRequestParts, MatchedPath, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 当前请求的已认证用户（由访问控制中间件写入请求扩展）
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

// 实现 FromRequestParts 以便在 handler 中直接提取 CurrentUser
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// 访问控制中间件
///
/// 必须通过 `Router::route_layer` 挂载，才能拿到匹配的路由模板。
pub async fn access_gate_middleware(
    State(gate): State<Arc<AccessGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let route_id = RouteId::new(req.method(), &path);

    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let decision = gate.decide(&route_id, authorization.as_deref()).await?;
    match decision {
        Decision::Allow(identity) => {
            if let Some(identity) = identity {
                req.extensions_mut().insert(identity);
            }
            Ok(next.run(req).await)
        }
        Decision::Deny(reason) => Err(reason.into()),
    }
}
