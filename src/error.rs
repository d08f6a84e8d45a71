//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// 登录失败、缺失或无效的令牌，统一对外表现
    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => "Invalid credentials".to_string(),
            AppError::Forbidden => "Forbidden".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// 错误类别标签；403 响应不带标签
    pub fn error_label(&self) -> Option<&'static str> {
        match self {
            AppError::Forbidden => None,
            _ => self.status_code().canonical_reason(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// 错误响应 DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            status_code: err.code(),
            message: err.user_message(),
            error: err.error_label(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), message = %self, "Application error");
        } else {
            tracing::debug!(code = self.code(), message = %self, "Request rejected");
        }

        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 请求体校验失败
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages(&e, &mut messages);
        messages.sort();
        messages.dedup();

        AppError::BadRequest(messages.join("; "))
    }
}

// 嵌套结构与列表中的错误一并收集
fn collect_validation_messages(errors: &validator::ValidationErrors, out: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => out.push(
                field_errors
                    .iter()
                    .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field)),
            ),
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(nested, out),
            ValidationErrorsKind::List(entries) => {
                for nested in entries.values() {
                    collect_validation_messages(nested, out);
                }
            }
        }
    }
}

/// 请求体无法解析为 JSON
impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest(e.body_text())
    }
}

/// 路径参数无法解析（例如非数字 id）
impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        match e {
            PathRejection::FailedToDeserializePathParams(inner) => {
                tracing::debug!(reason = %inner.body_text(), "Invalid path parameter");
                AppError::BadRequest("Validation failed (numeric string is expected)".to_string())
            }
            other => AppError::internal_error(other.body_text()),
        }
    }
}
