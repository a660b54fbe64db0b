//! 健康检查与跨域 API 集成测试

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};

mod common;
use common::{create_test_app, get_request};

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let res = app.send(get_request("/health", None)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert!(res.body["version"].is_string());
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = create_test_app();

    let res = app.send(get_request("/ready", None)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["ready"], true);
    assert_eq!(res.body["checks"][0]["name"], "database");
    assert_eq!(res.body["checks"][0]["status"], "healthy");
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let app = create_test_app();

    let res = app
        .send(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/auth/login")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(
        res.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        res.headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_other_origins() {
    let app = create_test_app();

    let res = app
        .send(
            Request::builder()
                .method("GET")
                .uri("/health")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app();

    let res = app.send(get_request("/no/such/route", None)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.send(get_request("/api/admin/nothing", None)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
