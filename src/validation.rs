//! 输入格式校验
//! 在触达存储之前拒绝格式不合法的输入

use crate::{error::AppError, models::user::Role};
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("username pattern is valid"));

/// 用户名：3-32 个字符，仅允许字母、数字和下划线
pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.len() < 3 || username.len() > 32 {
        return Err(AppError::validation("username length must be 3-32"));
    }
    if !USERNAME_PATTERN.is_match(username) {
        return Err(AppError::validation(
            "username only allows letters, digits and underscore",
        ));
    }
    Ok(())
}

/// 密码：8-72 字节
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 72 {
        return Err(AppError::validation("password length must be 8-72"));
    }
    Ok(())
}

/// 角色：user 或 admin
pub fn validate_role(role: &str) -> Result<Role, AppError> {
    role.parse()
        .map_err(|_| AppError::validation("role must be user or admin"))
}

/// 解析正整数 ID（路径参数），失败返回 None
pub fn parse_positive_id(raw: &str) -> Option<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => None,
    }
}

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    /// 从查询字符串解析分页参数
    pub fn parse(
        page: Option<&str>,
        page_size: Option<&str>,
        default_page_size: i64,
        max_page_size: i64,
    ) -> Result<Self, AppError> {
        let page = match page.filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::validation("page must be a positive integer"))?,
            None => 1,
        };

        let page_size = match page_size.filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::validation("pageSize must be a positive integer"))?,
            None => default_page_size,
        };

        if page < 1 || page_size < 1 || page_size > max_page_size {
            return Err(AppError::Validation(format!(
                "page must be >=1 and pageSize must be between 1 and {}",
                max_page_size
            )));
        }

        // 偏移量必须能用 i64 表示
        if (page - 1).checked_mul(page_size).is_none() {
            return Err(AppError::validation("page must be a positive integer"));
        }

        Ok(Self { page, page_size })
    }

    /// parse 已保证不会溢出
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}
