//! 路由注册
//! 创建所有 API 路由，声明每条路由的访问策略并应用中间件

use axum::{
    http::Method,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::{
    auth::{access_gate_middleware, registry::RegistryError, RouteRegistry},
    handlers,
    middleware::{request_tracking_middleware, AppState},
    models::user::Role,
};

pub const LOGIN: &str = "/auth/login";
pub const USERS: &str = "/users";
pub const USER: &str = "/users/{id}";
pub const ITEMS: &str = "/items";
pub const ITEM: &str = "/items/{id}";
pub const HEALTH: &str = "/health";

/// 请求体大小上限（字节）
const MAX_BODY_BYTES: usize = 64 * 1024;

/// 路由访问策略表
///
/// 这里没有登记的路由按“需要登录”处理。
pub fn route_registry() -> Result<RouteRegistry, RegistryError> {
    RouteRegistry::builder()
        // 公开端点
        .public(Method::GET, HEALTH)
        .public(Method::POST, LOGIN)
        .public(Method::POST, ITEMS)
        .public(Method::PATCH, ITEM)
        .public(Method::DELETE, ITEM)
        // 用户管理（仅管理员）
        .protected(Method::GET, USERS, [Role::Admin])
        .protected(Method::POST, USERS, [Role::Admin])
        .protected(Method::GET, USER, [Role::Admin])
        .protected(Method::PATCH, USER, [Role::Admin])
        .protected(Method::DELETE, USER, [Role::Admin])
        .build()
}

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(HEALTH, get(handlers::health::health_check))
        .route(LOGIN, post(handlers::auth::login))
        .route(
            USERS,
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            USER,
            get(handlers::user::get_user)
                .patch(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route(ITEMS, post(handlers::item::create_item))
        .route(
            ITEM,
            patch(handlers::item::update_item).delete(handlers::item::delete_item),
        )
        // 只作用于已匹配的路由，保证中间件能拿到 MatchedPath
        .route_layer(axum::middleware::from_fn_with_state(
            state.gate.clone(),
            access_gate_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(request_tracking_middleware))
        .with_state(state)
}
