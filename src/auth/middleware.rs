//! 认证中间件
//! 校验 Bearer 访问令牌并把当前用户放入请求扩展

use crate::{error::AppError, middleware::AppState, models::user::Role};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

/// 当前请求的已认证用户（每次请求都从存储重新读取）
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub is_banned: bool,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }

    /// 仅管理员可通过
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin role required".to_string()))
        }
    }

    /// 资源所有者或管理员
    pub fn can_modify(&self, owner_id: i64) -> bool {
        self.id == owner_id || self.is_admin()
    }
}

// 在 handler 中直接提取 AuthUser
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::AuthRequired("authorization header is required".to_string()))
    }
}

/// 读取 Authorization 头；空值视为未提供，非 UTF-8 的值按空串处理（随后判定为格式错误）
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_str().unwrap_or_default())
}

/// 解析 `Bearer <token>`
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AppError> {
    let header = header.ok_or_else(|| {
        AppError::AuthRequired("authorization header is required".to_string())
    })?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::invalid_token("authorization header must be Bearer token"))
}

/// 认证中间件 - 必须认证
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = state
        .sessions
        .authenticate(authorization_header(req.headers()))
        .await?;

    tracing::debug!(user_id = user.id, "Request authenticated");

    // 附加到请求扩展
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
