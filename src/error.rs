//! 统一错误模型
//! 定义所有错误类型和错误响应格式 `{code, message, details, requestId}`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication required: {0}")]
    AuthRequired(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("User is banned")]
    UserBanned,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Username already exists")]
    UsernameExists,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthRequired(_)
            | AppError::InvalidToken(_)
            | AppError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            AppError::UserBanned | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::UsernameExists => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取错误码（客户端据此分支处理）
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::AuthRequired(_) => "AUTH_REQUIRED",
            AppError::InvalidToken(_) => "AUTH_INVALID_TOKEN",
            AppError::InvalidCredentials(_) => "AUTH_INVALID_CREDENTIALS",
            AppError::UserBanned => "USER_BANNED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::UsernameExists => "USERNAME_EXISTS",
            AppError::Database(_) => "DB_ERROR",
            AppError::Config(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 获取返回给客户端的错误消息
    ///
    /// 基础设施错误目前原样透传，生产部署前应收敛。
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::AuthRequired(msg)
            | AppError::InvalidToken(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::Forbidden(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::UserBanned => "user is banned".to_string(),
            AppError::UserNotFound => "user not found".to_string(),
            AppError::UsernameExists => "username already exists".to_string(),
            AppError::Database(e) => e.to_string(),
            AppError::Config(_) => "configuration error".to_string(),
        }
    }

    // 便捷方法
    pub fn validation(msg: &str) -> Self {
        AppError::Validation(msg.to_string())
    }

    pub fn invalid_token(msg: &str) -> Self {
        AppError::InvalidToken(msg.to_string())
    }

    pub fn internal_error(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    pub details: serde_json::Value,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            code: self.code(),
            message: self.user_message(),
            details: serde_json::Value::Object(Default::default()),
            request_id: crate::middleware::current_request_id(),
        };

        // 记录错误日志：客户端错误 warn，服务端错误 error
        if status.is_server_error() {
            tracing::error!(
                code = error_response.code,
                error = %self,
                request_id = %error_response.request_id,
                "Application error"
            );
        } else {
            tracing::warn!(
                code = error_response.code,
                message = %error_response.message,
                request_id = %error_response.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 请求体解析失败统一映射为校验错误
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
            _ => AppError::validation("json body is required"),
        }
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}
