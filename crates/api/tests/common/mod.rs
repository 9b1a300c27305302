#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use ppewatch_api::auth::jwt::{generate_access_token, JwtConfig, DEFAULT_AUDIENCE};
use ppewatch_api::config::ServerConfig;
use ppewatch_api::router::build_app_router;
use ppewatch_api::state::AppState;
use ppewatch_storage::local::LocalObjectStore;
use ppewatch_storage::{StorageConfig, DEFAULT_BUCKET};
use ppewatch_vision::{VisionClient, VisionConfig};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const TEST_PUBLIC_BASE_URL: &str = "http://localhost:3000/storage";
pub const MULTIPART_BOUNDARY: &str = "ppewatch-test-boundary";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        audience: DEFAULT_AUDIENCE.to_string(),
    }
}

/// Build a test `ServerConfig` storing images under `storage_root`.
pub fn test_config(storage_root: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 90,
        max_upload_bytes: 1024 * 1024,
        jwt: jwt_config(),
        storage: StorageConfig::local(storage_root),
    }
}

/// Build the full application router, pointing the vision client at
/// `vision_url` (a mockito server) and the object store at `storage_root`.
pub fn build_test_app(pool: PgPool, vision_url: &str, storage_root: &Path) -> Router {
    let config = test_config(storage_root);

    let vision = VisionClient::new(VisionConfig {
        api_url: vision_url.to_string(),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        temperature: 0.3,
        timeout_secs: 5,
    })
    .unwrap();

    let store = LocalObjectStore::new(storage_root, DEFAULT_BUCKET, TEST_PUBLIC_BASE_URL);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        vision: Arc::new(vision),
        store: Arc::new(store),
    };

    build_app_router(state, &config)
}

/// A valid bearer token for `user_id`.
pub fn token_for(user_id: Uuid) -> String {
    generate_access_token(user_id, 900, &jwt_config()).unwrap()
}

fn authorized(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let request = authorized(Request::get(uri), token)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = authorized(Request::post(uri), token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST `body` verbatim with the given content type.
pub async fn post_raw(
    app: Router,
    uri: &str,
    token: Option<&str>,
    content_type: &str,
    body: &str,
) -> Response<Body> {
    let request = authorized(Request::post(uri), token)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// One part of a multipart form body.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

/// An `image` part holding `data`.
pub fn image_part<'a>(file_name: &'a str, data: &'a [u8]) -> Part<'a> {
    Part {
        name: "image",
        file_name: Some(file_name),
        content_type: Some("image/jpeg"),
        data,
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        let disposition = match part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\n",
                part.name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: Router,
    uri: &str,
    token: Option<&str>,
    parts: &[Part<'_>],
) -> Response<Body> {
    let request = authorized(Request::post(uri), token)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// A chat-completions response whose single answer is `content`.
pub fn chat_completion(content: &str) -> String {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}
