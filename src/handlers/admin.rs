//! 用户管理 HTTP 处理器（仅管理员）

use crate::{
    auth::AuthUser,
    error::AppError,
    middleware::{ApiJson, AppState},
    models::user::UpdateRoleRequest,
    response,
    validation::{parse_positive_id, validate_role, Pagination},
};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 50;

/// 分页查询参数（原样接收字符串，自行校验）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

fn user_id_from_path(raw: &str) -> Result<i64, AppError> {
    parse_positive_id(raw).ok_or_else(|| AppError::validation("invalid user id"))
}

/// 用户列表
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;

    let pagination = Pagination::parse(
        query.page.as_deref(),
        query.page_size.as_deref(),
        DEFAULT_PAGE_SIZE,
        MAX_PAGE_SIZE,
    )?;

    let page = state.admin.list_users(pagination).await?;

    Ok(response::ok("success", page))
}

/// 变更用户角色
pub async fn update_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    let user_id = user_id_from_path(&user_id)?;
    let role = validate_role(&req.role)?;

    let user = state.admin.update_role(auth_user.id, user_id, role).await?;

    Ok(response::ok("role updated", user))
}

/// 封禁 / 解封用户
pub async fn update_ban(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    let user_id = user_id_from_path(&user_id)?;

    let is_banned = body
        .get("isBanned")
        .and_then(serde_json::Value::as_bool)
        .ok_or_else(|| AppError::validation("isBanned(bool) is required"))?;

    let user = state
        .admin
        .set_ban_status(auth_user.id, user_id, is_banned)
        .await?;

    Ok(response::ok("ban status updated", user))
}
