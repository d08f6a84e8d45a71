//! 测试公共模块
//! 基于内存存储构建应用，无需数据库
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use bazaar_api::{
    auth::{AccessGate, CredentialVerifier, PasswordHasher, TokenCodec},
    config::{
        AdminSeedConfig, AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig,
    },
    error::AppError,
    middleware::AppState,
    models::user::{Identity, NewUser, UserChanges, UserRecord},
    repository::{InMemoryItemStore, InMemoryUserStore, ItemStore, UserDirectory, UserStore},
    routes,
    services::AuthService,
};
use async_trait::async_trait;
use http_body_util::BodyExt;
use secrecy::Secret;
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new("postgresql://localhost/bazaar_test".to_string()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_SECRET.to_string()),
            access_token_exp_secs: 300, // 5分钟用于测试
        },
        admin: AdminSeedConfig::default(),
    }
}

/// 测试应用：路由状态加上直接操作存储与令牌的句柄
pub struct TestApp {
    pub state: Arc<AppState>,
    pub users: Arc<InMemoryUserStore>,
    pub items: Arc<InMemoryItemStore>,
    pub tokens: Arc<TokenCodec>,
    pub hasher: PasswordHasher,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let items = Arc::new(InMemoryItemStore::new());
        let hasher = PasswordHasher::new();
        let (state, tokens) = assemble(users.clone(), users.clone(), items.clone(), &hasher);

        Self {
            state,
            users,
            items,
            tokens,
            hasher,
        }
    }

    pub fn router(&self) -> Router {
        routes::create_router(self.state.clone())
    }

    /// 创建测试用户
    pub async fn create_user(&self, username: &str, password: &str, is_admin: bool) -> Identity {
        self.users
            .create(NewUser {
                username: username.to_string(),
                password_hash: self.hasher.hash(password).expect("Hashing should succeed"),
                is_admin,
            })
            .await
            .expect("Failed to create test user")
    }

    /// 为用户签发令牌
    pub fn token_for(&self, identity: &Identity) -> String {
        self.tokens.issue(identity).expect("Failed to issue token")
    }

    /// 发送请求
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.router().oneshot(request).await.unwrap()
    }
}

fn assemble(
    user_store: Arc<dyn UserStore>,
    directory: Arc<dyn UserDirectory>,
    item_store: Arc<dyn ItemStore>,
    hasher: &PasswordHasher,
) -> (Arc<AppState>, Arc<TokenCodec>) {
    let config = create_test_config();

    let tokens = Arc::new(
        TokenCodec::from_config(&config.security).expect("Failed to create token codec"),
    );
    let registry = Arc::new(routes::route_registry().expect("Failed to build route registry"));
    let credentials = Arc::new(
        CredentialVerifier::new(directory, hasher.clone())
            .expect("Failed to create credential verifier"),
    );
    let gate = Arc::new(AccessGate::new(registry, tokens.clone(), credentials.clone()));

    let state = Arc::new(AppState {
        users: user_store,
        items: item_store,
        hasher: hasher.clone(),
        auth_service: Arc::new(AuthService::new(credentials, tokens.clone())),
        gate,
    });

    (state, tokens)
}

/// 每次查询都失败的用户存储，模拟数据库不可用
pub struct UnavailableUserStore;

fn unavailable() -> AppError {
    AppError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl UserDirectory for UnavailableUserStore {
    async fn find_by_username(&self, _username: &str) -> Result<Option<Identity>, AppError> {
        Err(unavailable())
    }

    async fn find_by_username_with_hash(
        &self,
        _username: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        Err(unavailable())
    }
}

#[async_trait]
impl UserStore for UnavailableUserStore {
    async fn find_by_id(&self, _id: i64) -> Result<Option<Identity>, AppError> {
        Err(unavailable())
    }

    async fn list(&self) -> Result<Vec<Identity>, AppError> {
        Err(unavailable())
    }

    async fn create(&self, _user: NewUser) -> Result<Identity, AppError> {
        Err(unavailable())
    }

    async fn update(&self, _id: i64, _changes: UserChanges) -> Result<Option<Identity>, AppError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: i64) -> Result<bool, AppError> {
        Err(unavailable())
    }
}

/// 用户存储不可用时的路由，以及可签发有效令牌的编解码器
pub fn unavailable_directory_router() -> (Router, Arc<TokenCodec>) {
    let store = Arc::new(UnavailableUserStore);
    let (state, tokens) = assemble(
        store.clone(),
        store,
        Arc::new(InMemoryItemStore::new()),
        &PasswordHasher::new(),
    );

    (routes::create_router(state), tokens)
}

/// 读取响应体为 JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// 读取响应体原始字节
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}
