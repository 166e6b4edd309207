//! # Login Tests

use super::*;
use lib_auth::decode_jwt;

const SECRET: &str = "test-secret-key-must-be-at-least-32-characters-long!";

#[tokio::test]
async fn test_login_issues_token_with_roles() {
    let pool = setup_test_db().await;
    let app = test_app(pool);

    let token = register_and_login(&app, "alice").await;

    let claims = decode_jwt(&token, SECRET).unwrap();
    assert_eq!(claims.sub, "alice@example.com");
    assert_eq!(claims.roles, vec!["User"]);
    assert!(claims.exp > claims.iat);
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let pool = setup_test_db().await;
    let app = test_app(pool);
    register_and_login(&app, "alice").await;

    let (wrong_status, wrong_body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "not-the-password" })),
    )
    .await;
    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "ghost@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], "Invalid email or password.");
}

#[tokio::test]
async fn test_manage_users_probe() {
    let pool = setup_test_db().await;
    let app = test_app(pool.clone());
    let user_token = register_and_login(&app, "alice").await;

    let (anonymous, _) = send(&app, "GET", "/api/v1/auth/manage_users", None, None).await;
    let (as_user, body) = send(
        &app,
        "GET",
        "/api/v1/auth/manage_users",
        Some(&user_token),
        None,
    )
    .await;
    assert_eq!(anonymous, StatusCode::UNAUTHORIZED);
    assert_eq!(as_user, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "Forbidden");

    // Granting the role takes effect without logging in again.
    let alice = lib_core::model::store::UserRepository::find_by_email(&pool, "alice@example.com")
        .await
        .unwrap()
        .unwrap();
    promote(&pool, alice.id, "Admin").await;

    let (as_admin, body) = send(
        &app,
        "GET",
        "/api/v1/auth/manage_users",
        Some(&user_token),
        None,
    )
    .await;
    assert_eq!(as_admin, StatusCode::OK);
    assert_eq!(body["message"], "You have access to manage users.");
}

#[tokio::test]
async fn test_forged_token_is_rejected() {
    let pool = setup_test_db().await;
    let app = test_app(pool);
    let forged = lib_auth::encode_jwt(
        "alice@example.com",
        vec!["Admin".to_string()],
        "another-secret-that-is-also-32-characters-long",
        1,
    )
    .unwrap();

    let (status, body) = send(&app, "GET", "/api/v1/users/me", Some(&forged), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "Unauthenticated");
}
