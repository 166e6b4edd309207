//! Shared fixtures for unit and handler tests.

use crate::server::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use lib_core::model::store::RoleRepository;
use lib_core::{create_pool, run_migrations, Config, DbPool};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// In-memory database with migrations applied.
pub async fn setup_test_db() -> DbPool {
    let pool = create_pool("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    pool
}

/// File-backed database with a real multi-connection pool.
///
/// Keep the returned directory alive for as long as the pool is used.
pub async fn setup_file_db() -> (TempDir, DbPool) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite:{}", dir.path().join("market.db").display());
    let pool = create_pool(&url).await.expect("Failed to create test database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    (dir, pool)
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-key-must-be-at-least-32-characters-long!".to_string(),
        jwt_expiration_hours: 24,
    }
}

/// Give `user_id` the named seeded role.
pub async fn promote(pool: &DbPool, user_id: i64, role: &str) {
    let role = RoleRepository::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("seeded role");
    RoleRepository::assign(pool, user_id, role.id).await.unwrap();
}

/// The full application router over `pool`.
pub fn test_app(pool: DbPool) -> Router {
    create_router(AppState {
        db: pool,
        config: test_config(),
    })
}

/// Send one request and decode the body as JSON (plain-text bodies come back
/// as a JSON string, empty bodies as `null`).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

/// Register `name` through the API and return a bearer token for it.
pub async fn register_and_login(app: &Router, name: &str) -> String {
    let email = format!("{name}@example.com");
    let (status, _) = send(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(serde_json::json!({
            "username": name,
            "email": email,
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(serde_json::json!({ "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token").to_string()
}
