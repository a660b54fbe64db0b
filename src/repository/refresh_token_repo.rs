//! Refresh token repository (刷新令牌数据访问)
//!
//! 只存储令牌的 SHA-256 哈希；轮换在单个事务内完成。

use crate::{
    auth::refresh_token::{generate_raw_token, hash_token},
    error::AppError,
    models::auth::{RefreshToken, Rotation},
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::{PgPool, Postgres, Transaction};

/// 刷新令牌存储接口
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// 为用户签发新令牌，返回原始令牌（仅此一次可见）
    async fn issue(&self, user_id: i64) -> Result<String, AppError>;

    /// 轮换：作废旧令牌并签发唯一的后继令牌
    ///
    /// 未知、已作废或已过期的令牌返回 `AUTH_INVALID_TOKEN`，重放检测即依赖于此。
    async fn rotate(&self, raw_token: &str) -> Result<Rotation, AppError>;

    /// 作废单个令牌，令牌不存在不算错误
    async fn revoke(&self, raw_token: &str) -> Result<bool, AppError>;

    /// 作废用户的所有有效令牌，返回作废数量
    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError>;
}

pub struct PgRefreshTokenStore {
    db: PgPool,
    ttl_days: i64,
}

impl PgRefreshTokenStore {
    pub fn new(db: PgPool, ttl_days: i64) -> Self {
        Self { db, ttl_days }
    }

    async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
    ) -> Result<String, AppError> {
        let raw_token = generate_raw_token()?;
        let expires_at = Utc::now() + Duration::days(self.ttl_days);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(hash_token(&raw_token))
        .bind(expires_at)
        .execute(&mut **tx)
        .await?;

        Ok(raw_token)
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn issue(&self, user_id: i64) -> Result<String, AppError> {
        let mut tx = self.db.begin().await?;
        let raw_token = self.insert(&mut tx, user_id).await?;
        tx.commit().await?;

        Ok(raw_token)
    }

    async fn rotate(&self, raw_token: &str) -> Result<Rotation, AppError> {
        let mut tx = self.db.begin().await?;

        // 行锁保证同一令牌的并发轮换只有一个成功
        let current = sqlx::query_as::<_, RefreshToken>(
            r#"
            SELECT * FROM refresh_tokens
            WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > NOW()
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(hash_token(raw_token))
        .fetch_optional(&mut *tx)
        .await?;

        // tx 被丢弃时自动回滚
        let Some(current) = current else {
            return Err(AppError::invalid_token("refresh token invalid or expired"));
        };

        sqlx::query("UPDATE refresh_tokens SET revoked_at = NOW() WHERE id = $1")
            .bind(current.id)
            .execute(&mut *tx)
            .await?;

        let successor = self.insert(&mut tx, current.user_id).await?;

        tx.commit().await?;

        tracing::debug!(user_id = current.user_id, token_id = current.id, "Refresh token rotated");

        Ok(Rotation {
            user_id: current.user_id,
            raw_token: successor,
        })
    }

    async fn revoke(&self, raw_token: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(hash_token(raw_token))
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_user(&self, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
