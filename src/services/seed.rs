//! 启动时初始化管理员账户

use crate::{
    auth::PasswordHasher,
    config::AdminSeedConfig,
    error::AppError,
    models::user::NewUser,
    repository::{UserDirectory, UserStore},
};
use secrecy::ExposeSecret;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// 未配置管理员用户名
    Skipped,
    AlreadyPresent,
    Created,
}

/// 若配置了管理员且该用户不存在，则创建之
pub async fn seed_admin(
    users: &dyn UserStore,
    hasher: &PasswordHasher,
    config: &AdminSeedConfig,
) -> Result<SeedOutcome, AppError> {
    let Some(username) = config.username.as_deref() else {
        return Ok(SeedOutcome::Skipped);
    };

    if users.find_by_username(username).await?.is_some() {
        tracing::debug!(%username, "Admin account already present");
        return Ok(SeedOutcome::AlreadyPresent);
    }

    let password = config
        .password
        .as_ref()
        .map(|p| p.expose_secret().as_str())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Config("Admin password is not set".to_string()))?;

    let admin = users
        .create(NewUser {
            username: username.to_string(),
            password_hash: hasher.hash(password)?,
            is_admin: true,
        })
        .await?;

    tracing::info!(user_id = admin.id, %username, "Admin account created");
    Ok(SeedOutcome::Created)
}
