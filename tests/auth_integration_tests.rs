mod common;

use axum::http::{Method, StatusCode};
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, TestApp};
use serde_json::json;

async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, serde_json::Value) {
    app.call(
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let app = TestApp::new();
    let (status, body) = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    assert_eq!(body["data"]["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn issued_token_unlocks_protected_routes() {
    let app = TestApp::new();
    let (_, body) = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, me) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["_id"], app.admin.id.to_string());
    assert_eq!(me["data"]["username"], "admin");

    let (status, _) = app
        .call(
            Method::POST,
            "/api/skills",
            Some(&token),
            Some(json!({ "name": "Rust", "level": 80 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn email_match_ignores_case_and_whitespace() {
    let app = TestApp::new();
    let (status, _) = login(&app, "  ADMIN@Example.com ", ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_identically() {
    let app = TestApp::new();

    let (wrong_status, wrong_body) = login(&app, ADMIN_EMAIL, "not-the-password").await;
    let (unknown_status, unknown_body) = login(&app, "nobody@example.com", ADMIN_PASSWORD).await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid credentials");
    assert!(wrong_body.get("data").is_none());
}

#[tokio::test]
async fn me_for_a_removed_admin_is_not_found() {
    let app = TestApp::new();
    let stranger = portfolio_api::models::Administrator::new(
        "ghost",
        "ghost@example.com",
        "hash".to_string(),
        chrono::Utc::now(),
    );
    let token = app.state.auth.issue_token(&stranger).unwrap();

    let (status, body) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn login_surfaces_store_failure_as_server_error() {
    let app = TestApp::new();
    app.admins.fail();

    let (status, body) = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Server error");
}

#[tokio::test]
async fn concurrent_logins_all_succeed() {
    let app = TestApp::new();

    let (a, b, c) = tokio::join!(
        login(&app, ADMIN_EMAIL, ADMIN_PASSWORD),
        login(&app, ADMIN_EMAIL, ADMIN_PASSWORD),
        login(&app, ADMIN_EMAIL, ADMIN_PASSWORD),
    );
    for (status, body) in [a, b, c] {
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["token"].is_string());
    }
}
