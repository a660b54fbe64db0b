//! 认证相关的 HTTP 处理器

use crate::{
    auth::{refresh_token::extract_refresh_token, AuthUser},
    error::AppError,
    middleware::{ApiJson, AppState},
    models::auth::{AuthPayload, ChangePasswordRequest, CredentialsRequest},
    response,
    services::SessionGrant,
};
use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

/// 下发刷新令牌 Cookie，返回响应体
fn issue_session(state: &AppState, jar: CookieJar, grant: SessionGrant) -> (CookieJar, AuthPayload) {
    let jar = jar.add(state.cookies.build(&grant.refresh_token));

    (
        jar,
        AuthPayload {
            access_token: grant.access_token,
            user: grant.user,
        },
    )
}

/// 注册
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let grant = state.sessions.register(req).await?;
    let (jar, payload) = issue_session(&state, jar, grant);

    Ok((jar, response::created("registered", payload)))
}

/// 登录
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let grant = state.sessions.login(req).await?;
    let (jar, payload) = issue_session(&state, jar, grant);

    Ok((jar, response::ok("logged in", payload)))
}

/// 刷新令牌（读取 Cookie 并轮换）
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let raw_token = extract_refresh_token(&jar);
    let grant = state.sessions.refresh(raw_token.as_deref()).await?;
    let (jar, payload) = issue_session(&state, jar, grant);

    Ok((jar, response::ok("refreshed", payload)))
}

/// 登出（总是成功，并清除 Cookie）
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let raw_token = extract_refresh_token(&jar);
    state.sessions.logout(raw_token.as_deref()).await;

    let jar = jar.add(state.cookies.clear());

    (jar, response::ok("logged out", json!({ "ok": true })))
}

/// 修改密码（需要认证）
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let grant = state.sessions.change_password(&auth_user, req).await?;
    let (jar, payload) = issue_session(&state, jar, grant);

    Ok((jar, response::ok("password changed", payload)))
}
