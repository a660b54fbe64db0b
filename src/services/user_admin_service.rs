//! 用户管理服务：分页列表、角色变更、封禁，以及默认管理员初始化

use crate::{
    auth::password::PasswordHasher,
    error::AppError,
    models::user::{Role, UserPage, UserResponse},
    repository::UserStore,
    validation::{validate_password, validate_username, Pagination},
};
use std::sync::Arc;

pub struct UserAdminService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserAdminService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// 分页列出用户
    pub async fn list_users(&self, pagination: Pagination) -> Result<UserPage, AppError> {
        let users = self
            .users
            .list(pagination.page_size, pagination.offset())
            .await?;
        let total = self.users.count().await?;

        Ok(UserPage {
            items: users.into_iter().map(UserResponse::from).collect(),
            page: pagination.page,
            page_size: pagination.page_size,
            total,
        })
    }

    /// 变更角色，立即对后续请求生效
    pub async fn update_role(
        &self,
        admin_id: i64,
        user_id: i64,
        role: Role,
    ) -> Result<UserResponse, AppError> {
        if !self.users.update_role(user_id, role).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!(admin_id, user_id, role = %role, "User role updated");

        self.reload(user_id).await
    }

    /// 设置封禁状态；下一次请求或刷新即被拒绝
    pub async fn set_ban_status(
        &self,
        admin_id: i64,
        user_id: i64,
        is_banned: bool,
    ) -> Result<UserResponse, AppError> {
        if !self.users.update_ban_status(user_id, is_banned).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::warn!(admin_id, user_id, is_banned, "User ban status updated");

        self.reload(user_id).await
    }

    /// 确保默认管理员存在，返回是否新建
    pub async fn seed_default_admin(&self, username: &str, password: &str) -> Result<bool, AppError> {
        validate_username(username)
            .map_err(|e| AppError::Config(format!("admin seed username is invalid: {}", e)))?;
        validate_password(password)
            .map_err(|e| AppError::Config(format!("admin seed password is invalid: {}", e)))?;

        let password_hash = self.hasher.hash_blocking(password).await?;
        let created = self.users.ensure_admin(username, &password_hash).await?;

        if created {
            tracing::warn!(
                username = %username,
                "Default admin account created, change its password after first login"
            );
        } else {
            tracing::info!("Default admin already exists, skip seeding");
        }

        Ok(created)
    }

    async fn reload(&self, user_id: i64) -> Result<UserResponse, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or(AppError::UserNotFound)
    }
}
