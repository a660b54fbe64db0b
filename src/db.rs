//! PostgreSQL 连接池、嵌入式迁移与连通性探测

use crate::config::DatabaseConfig;
use secrecy::ExposeSecret;
use sqlx::{migrate::MigrateError, postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// 按配置建立连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
            e
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool ready"
    );

    Ok(pool)
}

/// 执行 migrations/ 下的建表脚本（users、refresh_tokens）
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Migration failed");
            e
        })?;

    tracing::info!("Migrations applied");
    Ok(())
}

/// 就绪探针使用的连通性检查
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            tracing::warn!(error = %e, "Database ping failed");
            e
        })
}
