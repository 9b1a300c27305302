//! HTTP-level tests for image ingestion and detection lookup.
//!
//! The vision gateway is a mockito server; images land in a temp directory.

mod common;

use assert_matches::assert_matches;
use axum::http::{Request, StatusCode};
use common::{body_json, chat_completion, get, image_part, post_multipart, token_for, Part};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

const FENCED_VIOLATION: &str = "```json\n{\"detected\": [{\"type\": \"helmet\", \"confidence\": 70, \"location\": \"head\", \"status\": \"compliant\"}], \"missing\": [\"gloves\"], \"overallStatus\": \"violation\", \"avgConfidence\": 70}\n```";

async fn mock_answer(server: &mut mockito::ServerGuard, content: &str) -> mockito::Mock {
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion(content))
        .create_async()
        .await
}

async fn count(pool: &PgPool, sql: &str) -> i64 {
    sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
}

/// Number of regular files anywhere below `dir`.
fn stored_files(dir: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .map(|entry| entry.unwrap().path())
        .map(|path| if path.is_dir() { stored_files(&path) } else { 1 })
        .sum()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ingest_requires_token(pool: PgPool) {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, &server.url(), dir.path());

    let response = post_multipart(app, "/api/v1/detections", None, &[image_part("a.jpg", b"img")]).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ingest_rejects_invalid_token(pool: PgPool) {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, &server.url(), dir.path());

    let response = post_multipart(
        app,
        "/api/v1/detections",
        Some("not-a-jwt"),
        &[image_part("a.jpg", b"img")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cors_preflight_is_permissive(pool: PgPool) {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, &server.url(), dir.path());

    let request = Request::options("/api/v1/detections")
        .header("origin", "https://dashboard.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization, x-client-info, apikey, content-type")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let allowed = response.headers()["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("x-client-info"));
    assert!(allowed.contains("apikey"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ingest_records_detection_violations_and_summary(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    let mock = mock_answer(&mut server, FENCED_VIOLATION).await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), &server.url(), dir.path());
    let user = Uuid::new_v4();

    let response = post_multipart(
        app,
        "/api/v1/detections",
        Some(&token_for(user)),
        &[image_part("site cam.jpg", b"\xff\xd8\xffjpeg")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["detection"]["overall_status"], "violation");
    assert_eq!(json["detection"]["confidence_score"], 70.0);
    assert_eq!(json["detection"]["user_id"], user.to_string());
    assert!(json["detection"]["detection_results"].get("fallback").is_none());

    let image_url = json["imageUrl"].as_str().unwrap();
    let prefix = format!("http://localhost:3000/storage/detection-images/{user}/");
    assert!(image_url.starts_with(&prefix), "unexpected url {image_url}");
    assert!(image_url.ends_with("-site_cam.jpg"));
    assert_eq!(json["detection"]["image_url"], image_url);

    // The stored file sits under the bucket directory at the key.
    let key = &image_url["http://localhost:3000/storage/".len()..];
    let on_disk = std::fs::read(dir.path().join(key)).unwrap();
    assert_eq!(on_disk, b"\xff\xd8\xffjpeg");

    mock.assert_async().await;

    let detection_id = json["detection"]["id"].as_i64().unwrap();
    let violations: Vec<(String, String, bool)> = sqlx::query_as(
        "SELECT missing_ppe, severity, resolved FROM violations WHERE detection_id = $1",
    )
    .bind(detection_id)
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(violations, vec![("gloves".to_string(), "high".to_string(), false)]);

    let (total, violation_count): (i64, i64) = sqlx::query_as(
        "SELECT total_detections, violation_count FROM analytics_summary WHERE user_id = $1",
    )
    .bind(user)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!((total, violation_count), (1, 1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unparseable_answer_stores_tagged_fallback(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    mock_answer(&mut server, "Sorry, I can't tell what is in this picture.").await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), &server.url(), dir.path());

    let response = post_multipart(
        app,
        "/api/v1/detections",
        Some(&token_for(Uuid::new_v4())),
        &[image_part("a.jpg", b"img")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let detection = &json["detection"];
    assert_eq!(detection["overall_status"], "partial");
    assert_eq!(detection["confidence_score"], 87.5);
    assert_eq!(detection["detection_results"]["fallback"], true);
    assert_eq!(
        detection["detection_results"]["missing"],
        serde_json::json!(["gloves", "mask"])
    );

    let detection_id = detection["id"].as_i64().unwrap();
    let violations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM violations WHERE detection_id = $1")
        .bind(detection_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(violations, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_fields_use_defaults(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    mock_answer(&mut server, r#"{"detected": [], "missing": ["cape", "boots"]}"#).await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), &server.url(), dir.path());

    let response = post_multipart(
        app,
        "/api/v1/detections",
        Some(&token_for(Uuid::new_v4())),
        &[image_part("a.jpg", b"img")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["detection"]["overall_status"], "partial");
    assert_eq!(json["detection"]["confidence_score"], 85.0);

    // "cape" is not a PPE category and is dropped.
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM violations").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_image_returns_400(pool: PgPool) {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), &server.url(), dir.path());

    let response = post_multipart(
        app,
        "/api/v1/detections",
        Some(&token_for(Uuid::new_v4())),
        &[Part {
            name: "note",
            file_name: None,
            content_type: None,
            data: b"no picture today",
        }],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "MISSING_INPUT");
    assert_eq!(json["error"], "No image provided");
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM detections").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upstream_status_codes_are_mapped(pool: PgPool) {
    let cases = [
        (429, StatusCode::TOO_MANY_REQUESTS, "UPSTREAM_RATE_LIMITED"),
        (402, StatusCode::PAYMENT_REQUIRED, "UPSTREAM_BILLING_REQUIRED"),
        (500, StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
    ];

    for (upstream, expected, code) in cases {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(upstream)
            .with_body("gateway says no")
            .create_async()
            .await;
        let dir = tempfile::tempdir().unwrap();
        let app = common::build_test_app(pool.clone(), &server.url(), dir.path());

        let response = post_multipart(
            app,
            "/api/v1/detections",
            Some(&token_for(Uuid::new_v4())),
            &[image_part("a.jpg", b"img")],
        )
        .await;

        assert_eq!(response.status(), expected, "upstream {upstream}");
        assert_eq!(body_json(response).await["code"], code);
        assert_eq!(stored_files(dir.path()), 0, "upstream {upstream}: image left behind");
    }

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM detections").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM analytics_summary").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_image_twice_creates_two_detections(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_completion(FENCED_VIOLATION))
        .expect(2)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), &server.url(), dir.path());
    let token = token_for(Uuid::new_v4());

    for _ in 0..2 {
        let response = post_multipart(
            app.clone(),
            "/api/v1/detections",
            Some(&token),
            &[image_part("a.jpg", b"img")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    mock.assert_async().await;
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM detections").await, 2);
    assert_eq!(
        count(&pool, "SELECT total_detections FROM analytics_summary").await,
        2
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_detection_is_owner_scoped(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    mock_answer(&mut server, FENCED_VIOLATION).await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, &server.url(), dir.path());
    let owner = token_for(Uuid::new_v4());

    let created = post_multipart(
        app.clone(),
        "/api/v1/detections",
        Some(&owner),
        &[image_part("a.jpg", b"img")],
    )
    .await;
    let id = body_json(created).await["detection"]["id"].as_i64().unwrap();

    let response = get(app.clone(), &format!("/api/v1/detections/{id}"), Some(&owner)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["detection"]["id"], id);
    let violations = assert_matches!(json["violations"].as_array(), Some(v) => v.clone());
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0]["missing_ppe"], "gloves");

    let stranger = token_for(Uuid::new_v4());
    let response = get(app, &format!("/api/v1/detections/{id}"), Some(&stranger)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_successful_ingest_keeps_image(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    mock_answer(&mut server, FENCED_VIOLATION).await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, &server.url(), dir.path());

    let response = post_multipart(
        app,
        "/api/v1/detections",
        Some(&token_for(Uuid::new_v4())),
        &[image_part("a.jpg", b"img")],
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stored_files(dir.path()), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_oversized_upload_returns_413(pool: PgPool) {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .expect(0)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool.clone(), &server.url(), dir.path());

    // Test config caps bodies at 1 MiB.
    let big = vec![0u8; 2 * 1024 * 1024];
    let response = post_multipart(
        app,
        "/api/v1/detections",
        Some(&token_for(Uuid::new_v4())),
        &[image_part("big.jpg", &big)],
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");
    mock.assert_async().await;
    assert_eq!(stored_files(dir.path()), 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM detections").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_numeric_detection_id_is_json_validation_error(pool: PgPool) {
    let server = mockito::Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(pool, &server.url(), dir.path());

    let response = get(app, "/api/v1/detections/abc", Some(&token_for(Uuid::new_v4()))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
