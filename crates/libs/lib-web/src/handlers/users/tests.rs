//! # User Handler Tests

use crate::test_utils::{promote, register_and_login, send, setup_test_db, test_app};
use axum::http::StatusCode;
use lib_core::model::store::UserRepository;
use lib_core::DbPool;
use serde_json::json;

async fn user_id(pool: &DbPool, name: &str) -> i64 {
    UserRepository::find_by_email(pool, &format!("{name}@example.com"))
        .await
        .unwrap()
        .unwrap()
        .id
}

#[tokio::test]
async fn test_me_shows_roles_and_permissions() {
    let pool = setup_test_db().await;
    let app = test_app(pool);
    let token = register_and_login(&app, "alice").await;

    let (status, body) = send(&app, "GET", "/api/v1/users/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["balance"], "0.00");
    assert_eq!(body["roles"][0]["name"], "User");
    assert_eq!(body["roles"][0]["permissions"][0]["name"], "view_content");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_after_account_deleted() {
    let pool = setup_test_db().await;
    let app = test_app(pool.clone());
    let token = register_and_login(&app, "alice").await;
    UserRepository::delete(&pool, user_id(&pool, "alice").await)
        .await
        .unwrap();

    let (status, body) = send(&app, "GET", "/api/v1/users/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NotFound");
}

#[tokio::test]
async fn test_wallet_deposit_and_withdraw() {
    let pool = setup_test_db().await;
    let app = test_app(pool);
    let token = register_and_login(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users/wallet/deposit",
        Some(&token),
        Some(json!({ "amount": 40.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully deposited 40.50.");
    assert_eq!(body["new_balance"], "40.50");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users/wallet/withdraw",
        Some(&token),
        Some(json!({ "amount": "40.51" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InsufficientFunds");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users/wallet/withdraw",
        Some(&token),
        Some(json!({ "amount": "40.50" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new_balance"], "0.00");
}

#[tokio::test]
async fn test_wallet_rejects_bad_amounts() {
    let pool = setup_test_db().await;
    let app = test_app(pool);
    let token = register_and_login(&app, "alice").await;

    for amount in [json!(0), json!(-3), json!("abc"), json!("1.234")] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/users/wallet/deposit",
            Some(&token),
            Some(json!({ "amount": amount })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "amount {amount}");
        assert_eq!(body["code"], "InvalidInput");
    }
}

#[tokio::test]
async fn test_my_listings() {
    let pool = setup_test_db().await;
    let app = test_app(pool);
    let token = register_and_login(&app, "alice").await;
    send(
        &app,
        "POST",
        "/api/v1/listings",
        Some(&token),
        Some(json!({ "title": "Chair", "description": "Wooden", "price": "12.00" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/v1/users/me/listings", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listings"][0]["title"], "Chair");
}

#[tokio::test]
async fn test_delete_user_requires_manage_users() {
    let pool = setup_test_db().await;
    let app = test_app(pool.clone());
    let alice = register_and_login(&app, "alice").await;
    let admin = register_and_login(&app, "admin").await;
    promote(&pool, user_id(&pool, "admin").await, "Admin").await;
    register_and_login(&app, "victim").await;
    let victim = user_id(&pool, "victim").await;

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/users/{victim}"), Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/users/{victim}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("User with ID {victim} deleted successfully."));

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/users/{victim}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assign_role_requires_manage_roles() {
    let pool = setup_test_db().await;
    let app = test_app(pool.clone());
    let alice = register_and_login(&app, "alice").await;
    let admin = register_and_login(&app, "admin").await;
    promote(&pool, user_id(&pool, "admin").await, "Admin").await;
    let alice_id = user_id(&pool, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/users/{alice_id}/roles"),
        Some(&alice),
        Some(json!({ "role": "Admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/users/{alice_id}/roles"),
        Some(&admin),
        Some(json!({ "role": "Admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Role 'Admin' assigned to user {alice_id}."));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/users/{alice_id}/roles"),
        Some(&admin),
        Some(json!({ "role": "Wizard" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice's existing token now passes the guard.
    let (status, _) = send(&app, "GET", "/api/v1/auth/manage_users", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let pool = setup_test_db().await;
    let app = test_app(pool);

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}
