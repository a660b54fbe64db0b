//! 结构化日志初始化

use crate::config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 过滤规则：RUST_LOG 优先，否则使用配置级别；sqlx 语句日志压到 warn
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", level.to_lowercase())))
}

/// 安装全局订阅者，json 用于生产，pretty 用于本地开发
pub fn init_telemetry(config: &AppConfig) {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    let fmt_layer = if config.logging.format.eq_ignore_ascii_case("pretty") {
        fmt_layer.pretty().boxed()
    } else {
        fmt_layer.json().with_current_span(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.logging.level))
        .with(fmt_layer)
        .init();

    tracing::debug!(
        level = %config.logging.level,
        format = %config.logging.format,
        "Telemetry initialized"
    );
}
