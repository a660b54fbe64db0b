//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{
    auth::middleware::require_auth,
    error::AppError,
    handlers,
    middleware::{request_tracking_middleware, AppState, REQUEST_ID_HEADER},
};

/// 请求体大小上限
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: AppState) -> Result<Router, AppError> {
    let cors = cors_layer(&state.config.server.cors_allow_origin)?;

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需访问令牌）
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/logout", post(handlers::auth::logout));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password),
        )
        // 用户管理（管理员）
        .route("/api/admin/users", get(handlers::admin::list_users))
        .route("/api/admin/users/{id}/role", put(handlers::admin::update_role))
        .route("/api/admin/users/{id}/ban", put(handlers::admin::update_ban))
        // route_layer：未匹配的路径仍然返回 404
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let router = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(axum::middleware::from_fn(request_tracking_middleware))
        .with_state(state);

    Ok(router)
}

/// 跨域配置：携带 Cookie，因此只允许单个确定的来源
fn cors_layer(origin: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(origin.trim())
        .map_err(|e| AppError::Config(format!("invalid cors origin: {}", e)))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_credentials(true)
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]))
}
