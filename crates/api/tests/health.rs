//! Tests for the root-level health endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_returns_ok(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, "http://127.0.0.1:9", dir.path());

    let response = get(app, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json.get("db_healthy").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_db_pings_database(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, "http://127.0.0.1:9", dir.path());

    let response = get(app, "/health/db", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["db_healthy"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_response_carries_request_id(pool: PgPool) {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, "http://127.0.0.1:9", dir.path());

    let response = get(app, "/health", None).await;

    assert!(response.headers().contains_key("x-request-id"));
}
