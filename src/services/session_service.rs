//! 会话服务：注册、登录、令牌轮换、登出、修改密码
//! 以及每个请求的访问令牌校验

use crate::{
    auth::{jwt::AccessTokenCodec, middleware::parse_bearer, password::PasswordHasher, AuthUser},
    error::AppError,
    models::{
        auth::{ChangePasswordRequest, CredentialsRequest},
        user::{Role, User, UserResponse},
    },
    repository::{RefreshTokenStore, UserStore},
    validation::{validate_password, validate_username},
};
use std::sync::Arc;

/// 新签发的一对令牌及对应用户
#[derive(Debug)]
pub struct SessionGrant {
    pub access_token: String,
    /// 原始刷新令牌，只通过 Cookie 下发一次
    pub refresh_token: String,
    pub user: UserResponse,
}

pub struct SessionService {
    users: Arc<dyn UserStore>,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    codec: Arc<AccessTokenCodec>,
    hasher: PasswordHasher,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        codec: Arc<AccessTokenCodec>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            codec,
            hasher,
        }
    }

    /// 用户注册
    pub async fn register(&self, req: CredentialsRequest) -> Result<SessionGrant, AppError> {
        validate_username(&req.username)?;
        validate_password(&req.password)?;

        let password_hash = self.hasher.hash_blocking(&req.password).await?;
        let user = self
            .users
            .create(&req.username, &password_hash, Role::User)
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");

        self.grant(user).await
    }

    /// 用户登录
    pub async fn login(&self, req: CredentialsRequest) -> Result<SessionGrant, AppError> {
        // 登录只校验字段非空
        if req.username.is_empty() || req.password.is_empty() {
            return Err(AppError::validation("username and password are required"));
        }

        let user = self.users.find_by_username(&req.username).await?;
        let verified = match &user {
            Some(user) => {
                self.hasher
                    .verify_blocking(&req.password, &user.password_hash)
                    .await
            }
            // 未知用户也完整跑一次 KDF，响应耗时不暴露用户名是否存在
            None => self.hasher.verify_dummy_blocking(&req.password).await,
        };

        // 用户不存在与密码错误返回同一个错误
        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::warn!(username = %req.username, "Login failed");
                return Err(invalid_credentials());
            }
        };

        // 密码确认后才暴露封禁状态
        if user.is_banned {
            tracing::warn!(user_id = user.id, "Banned user attempted login");
            return Err(AppError::UserBanned);
        }

        tracing::info!(user_id = user.id, "User logged in");

        self.grant(user).await
    }

    /// 轮换刷新令牌并签发新的访问令牌
    ///
    /// 先轮换再检查封禁：被封禁用户的刷新尝试同样会消耗其令牌。
    pub async fn refresh(&self, raw_token: Option<&str>) -> Result<SessionGrant, AppError> {
        let raw_token = raw_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::AuthRequired("refresh token is required".to_string()))?;

        let rotation = self.refresh_tokens.rotate(raw_token).await?;

        let user = self
            .users
            .find_by_id(rotation.user_id)
            .await?
            .ok_or_else(|| AppError::invalid_token("user does not exist"))?;

        if user.is_banned {
            tracing::warn!(user_id = user.id, "Banned user attempted refresh");
            return Err(AppError::UserBanned);
        }

        let access_token = self.codec.issue_for(&user)?;

        tracing::info!(user_id = user.id, "Session refreshed");

        Ok(SessionGrant {
            access_token,
            refresh_token: rotation.raw_token,
            user: user.into(),
        })
    }

    /// 登出：尽力作废当前刷新令牌，任何失败都不对外暴露
    pub async fn logout(&self, raw_token: Option<&str>) {
        let Some(raw_token) = raw_token.filter(|t| !t.is_empty()) else {
            return;
        };

        match self.refresh_tokens.revoke(raw_token).await {
            Ok(revoked) => tracing::info!(revoked, "Logout"),
            Err(e) => tracing::warn!(error = %e, "Failed to revoke refresh token on logout"),
        }
    }

    /// 修改密码：作废该用户所有刷新令牌，并为调用者签发新会话
    pub async fn change_password(
        &self,
        auth: &AuthUser,
        req: ChangePasswordRequest,
    ) -> Result<SessionGrant, AppError> {
        validate_password(&req.current_password)?;
        validate_password(&req.new_password)?;

        if req.current_password == req.new_password {
            return Err(new_password_must_differ());
        }

        let user = self
            .users
            .find_by_id(auth.id)
            .await?
            .ok_or_else(|| AppError::invalid_token("user does not exist"))?;

        if !self
            .hasher
            .verify_blocking(&req.current_password, &user.password_hash)
            .await
        {
            return Err(AppError::InvalidCredentials(
                "current password is incorrect".to_string(),
            ));
        }

        // 新密码与已存储的哈希一致同样拒绝
        if self
            .hasher
            .verify_blocking(&req.new_password, &user.password_hash)
            .await
        {
            return Err(new_password_must_differ());
        }

        let password_hash = self.hasher.hash_blocking(&req.new_password).await?;
        if !self
            .users
            .update_password_hash(user.id, &password_hash)
            .await?
        {
            return Err(AppError::UserNotFound);
        }

        let revoked = self.refresh_tokens.revoke_all_for_user(user.id).await?;
        tracing::info!(user_id = user.id, revoked, "Password changed");

        self.grant(user).await
    }

    /// 校验 Authorization 头并重新读取用户
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthUser, AppError> {
        let token = parse_bearer(authorization)?;
        let claims = self.codec.verify(token)?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::invalid_token("user no longer exists"))?;

        if user.is_banned {
            return Err(AppError::UserBanned);
        }

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            role: user.role,
            is_banned: user.is_banned,
        })
    }

    async fn grant(&self, user: User) -> Result<SessionGrant, AppError> {
        let access_token = self.codec.issue_for(&user)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        Ok(SessionGrant {
            access_token,
            refresh_token,
            user: user.into(),
        })
    }
}

fn invalid_credentials() -> AppError {
    AppError::InvalidCredentials("invalid username or password".to_string())
}

fn new_password_must_differ() -> AppError {
    AppError::validation("new password must be different")
}
