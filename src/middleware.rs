//! HTTP 中间件
//! 应用状态、请求追踪、JSON 请求体提取

use crate::{
    auth::{jwt::AccessTokenCodec, password::PasswordHasher, refresh_token::RefreshCookiePolicy},
    config::AppConfig,
    error::AppError,
    repository::{RefreshTokenStore, UserStore},
    services::{SessionService, UserAdminService},
};
use axum::{
    extract::{FromRequest, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// 请求 ID 响应头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 应用状态
///
/// 服务使用 Arc 包装，Clone 只是指针拷贝
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<SessionService>,
    pub admin: Arc<UserAdminService>,
    pub cookies: RefreshCookiePolicy,
}

impl AppState {
    /// 根据配置和存储实现组装所有服务
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
    ) -> Result<Self, AppError> {
        let codec = Arc::new(AccessTokenCodec::from_config(&config)?);
        let hasher = PasswordHasher::new();

        let sessions = Arc::new(SessionService::new(
            users.clone(),
            refresh_tokens,
            codec,
            hasher.clone(),
        ));
        let admin = Arc::new(UserAdminService::new(users.clone(), hasher));
        let cookies = RefreshCookiePolicy::from_config(&config);

        Ok(Self {
            config: Arc::new(config),
            users,
            sessions,
            admin,
            cookies,
        })
    }
}

/// 当前请求的 request_id；在请求作用域之外生成新的 UUID
pub fn current_request_id() -> String {
    REQUEST_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| Uuid::new_v4().to_string())
}

/// 请求追踪中间件
/// 为每个请求确定 request_id，记录耗时并回写到响应头
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let request_id = extract_or_generate_request_id(req.headers());

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    // 创建 span
    let span = tracing::info_span!(
        "http_request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let scoped_id = request_id.clone();
    REQUEST_ID
        .scope(
            scoped_id,
            async move {
                let start = Instant::now();

                let mut response = next.run(req).await;

                let elapsed = start.elapsed();
                tracing::info!(
                    status = response.status().as_u16(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Request completed"
                );

                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }

                response
            }
            .instrument(span),
        )
        .await
}

/// 从请求头中提取或生成 request_id
fn extract_or_generate_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// JSON 请求体提取器，解析失败时返回统一错误格式
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
