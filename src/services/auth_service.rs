//! 认证服务：登录并签发访问令牌

use crate::{
    auth::{CredentialVerifier, TokenCodec},
    error::AppError,
    models::auth::{LoginRequest, LoginResponse},
};
use std::sync::Arc;

pub struct AuthService {
    credentials: Arc<CredentialVerifier>,
    tokens: Arc<TokenCodec>,
}

impl AuthService {
    pub fn new(credentials: Arc<CredentialVerifier>, tokens: Arc<TokenCodec>) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    /// 用户登录
    ///
    /// 用户不存在与密码错误返回同一个错误。
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, AppError> {
        let identity = match self
            .credentials
            .validate_with_password(&req.username, &req.password)
            .await
        {
            Ok(identity) => identity,
            Err(e) => {
                let err = AppError::from(e);
                if matches!(err, AppError::Unauthorized) {
                    tracing::info!("Login rejected");
                }
                return Err(err);
            }
        };

        let access_token = self.tokens.issue(&identity)?;

        tracing::info!(user_id = identity.id, "Login succeeded");

        Ok(LoginResponse { access_token })
    }
}
