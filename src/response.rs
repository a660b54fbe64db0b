//! 成功响应格式 `{code: "OK", message, data, requestId}`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub code: &'static str,
    pub message: &'static str,
    pub data: T,
    pub request_id: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &'static str, data: T) -> Self {
        Self {
            code: "OK",
            message,
            data,
            request_id: crate::middleware::current_request_id(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// 200 响应
pub fn ok<T: Serialize>(message: &'static str, data: T) -> Response {
    ApiResponse::ok(message, data).into_response()
}

/// 201 响应
pub fn created<T: Serialize>(message: &'static str, data: T) -> Response {
    (StatusCode::CREATED, ApiResponse::ok(message, data)).into_response()
}
