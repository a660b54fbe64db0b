//! 配置系统
//! 从环境变量加载所有配置（前缀 BLOG_），使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// 运行环境: development, production
    pub env: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:8080"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
    /// 允许跨域的前端来源（携带 Cookie，不能是通配符）
    pub cors_allow_origin: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    /// 最大连接数
    pub max_connections: u32,
    /// 最小连接数
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// 空闲连接超时时间（秒）
    pub idle_timeout_secs: u64,
    /// 连接最大生命周期（秒）
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// 访问令牌签名密钥（HS256，至少 32 字符）
    pub jwt_secret: Secret<String>,
    /// 访问令牌有效期（分钟）
    pub access_token_exp_minutes: i64,
    /// 刷新令牌有效期（天）
    pub refresh_token_exp_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeedConfig {
    /// 启动时确保存在的管理员用户名
    pub username: String,
    /// 初始密码（仅在首次创建时使用）
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub admin_seed: AdminSeedConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("app.env", "development")?
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("server.cors_allow_origin", "http://localhost:5173")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.jwt_secret", "PLEASE_CHANGE_ME_TO_A_LONG_RANDOM_SECRET")?
            .set_default("security.access_token_exp_minutes", 15)?
            .set_default("security.refresh_token_exp_days", 7)?
            .set_default("admin_seed.username", "admin")?
            .set_default("admin_seed.password", "ChangeMe123!")?;

        // 从环境变量加载配置（前缀为 BLOG_）
        settings = settings.add_source(
            Environment::with_prefix("BLOG")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 是否运行在生产环境（决定刷新令牌 Cookie 是否带 Secure）
    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.app.env.to_lowercase().as_str() {
            "development" | "production" | "test" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid app env: {}. Must be one of: development, production, test",
                    self.app.env
                )))
            }
        }

        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证数据库连接池配置
        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // 验证 JWT 密钥长度（至少 32 字符）
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // 验证令牌过期时间
        if !(1..=1440).contains(&self.security.access_token_exp_minutes) {
            return Err(ConfigError::Message(
                "access_token_exp_minutes must be between 1 and 1440".to_string(),
            ));
        }

        if !(1..=90).contains(&self.security.refresh_token_exp_days) {
            return Err(ConfigError::Message(
                "refresh_token_exp_days must be between 1 and 90".to_string(),
            ));
        }

        if self.server.cors_allow_origin.trim() == "*" {
            return Err(ConfigError::Message(
                "cors_allow_origin cannot be a wildcard when credentials are allowed".to_string(),
            ));
        }

        Ok(())
    }
}
