//! 认证 API 集成测试

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{body_bytes, body_json, TestApp};

fn invalid_credentials() -> serde_json::Value {
    json!({
        "statusCode": 401,
        "message": "Invalid credentials",
        "error": "Unauthorized"
    })
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let user = app.create_user("testuser", "TestPass123", false).await;

    let response = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "testuser", "password": "TestPass123" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let token = json["accessToken"].as_str().expect("accessToken should be a string");
    assert_eq!(json.as_object().unwrap().len(), 1);

    let claim = app.tokens.decode(token).unwrap();
    assert_eq!(claim.username, user.username);
    assert_eq!(claim.exp - claim.iat, 300);
}

#[tokio::test]
async fn test_login_user_not_found() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "testuser1", "password": "testPassword1" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, invalid_credentials());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.create_user("testuser", "TestPass123", false).await;

    let wrong_password = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "testuser", "password": "WrongPassword" })),
        )
        .await;
    let unknown_user = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "nobody", "password": "TestPass123" })),
        )
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_bytes(wrong_password).await, body_bytes(unknown_user).await);
}

#[tokio::test]
async fn test_login_validation() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "", "password": "x" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["statusCode"], 400);
    assert_eq!(json["error"], "Bad Request");
    assert_eq!(json["message"], "Username is required and cannot be empty.");
}

#[tokio::test]
async fn test_login_malformed_body() {
    let app = TestApp::new();

    let response = app
        .send(Method::POST, "/auth/login", None, Some(json!({ "username": "only" })))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["statusCode"], 400);
}

#[tokio::test]
async fn test_issued_token_opens_protected_route() {
    let app = TestApp::new();
    app.create_user("admin", "admin123", true).await;

    let login = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "admin123" })),
        )
        .await;
    let token = body_json(login).await["accessToken"].as_str().unwrap().to_string();

    let response = app.send(Method::GET, "/users", Some(&token), None).await;

    assert_eq!(response.status(), StatusCode::OK);
}
