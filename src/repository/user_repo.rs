//! User repository (数据库访问层)

use crate::{
    db,
    error::AppError,
    models::user::{Role, User},
};
use async_trait::async_trait;
use sqlx::PgPool;

/// 用户存储接口
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 根据用户名查找用户
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// 创建用户，用户名重复返回 UsernameExists
    async fn create(&self, username: &str, password_hash: &str, role: Role)
        -> Result<User, AppError>;

    /// 更新密码哈希，返回是否命中
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<bool, AppError>;

    /// 更新角色
    async fn update_role(&self, id: i64, role: Role) -> Result<bool, AppError>;

    /// 更新封禁状态
    async fn update_ban_status(&self, id: i64, is_banned: bool) -> Result<bool, AppError>;

    /// 分页列出用户（按 ID 升序）
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError>;

    /// 用户总数
    async fn count(&self) -> Result<i64, AppError>;

    /// 用户名不存在时创建管理员，返回是否新建
    async fn ensure_admin(&self, username: &str, password_hash: &str) -> Result<bool, AppError>;

    /// 存储连通性检查
    async fn ping(&self) -> Result<(), AppError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::UsernameExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_role(&self, id: i64, role: Role) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_ban_status(&self, id: i64, is_banned: bool) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET is_banned = $2 WHERE id = $1")
            .bind(id)
            .bind(is_banned)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id ASC LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.db)
                .await?;

        Ok(users)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;

        Ok(total)
    }

    async fn ensure_admin(&self, username: &str, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, 'admin')
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        db::ping(&self.db)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}
