//! 商品 API 集成测试（公开路由）

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{body_json, TestApp};

#[tokio::test]
async fn test_create_item_without_authorization() {
    let app = TestApp::new();

    let response = app
        .send(Method::POST, "/items", None, Some(json!({ "name": "lamp" })))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({ "id": 1, "name": "lamp", "listing": null, "comments": [], "tags": [] })
    );
}

#[tokio::test]
async fn test_public_route_ignores_bad_token() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/items",
            Some("not-a-token"),
            Some(json!({ "name": "lamp" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_update_and_delete_item() {
    let app = TestApp::new();
    app.send(Method::POST, "/items", None, Some(json!({ "name": "lamp" })))
        .await;

    let response = app
        .send(Method::PATCH, "/items/1", None, Some(json!({ "name": "desk lamp" })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "desk lamp");

    let response = app.send(Method::DELETE, "/items/1", None, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(Method::DELETE, "/items/1", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_missing_item() {
    let app = TestApp::new();

    let response = app
        .send(Method::PATCH, "/items/42", None, Some(json!({ "name": "x" })))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({ "statusCode": 404, "message": "Item with id 42 not found", "error": "Not Found" })
    );
}

#[tokio::test]
async fn test_create_item_validation() {
    let app = TestApp::new();

    let response = app
        .send(Method::POST, "/items", None, Some(json!({ "name": "" })))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "name should not be empty");
}

#[tokio::test]
async fn test_create_item_with_relations() {
    let app = TestApp::new();

    let response = app
        .send(
            Method::POST,
            "/items",
            None,
            Some(json!({
                "name": "lamp",
                "listing": { "description": "brass desk lamp", "rating": 4.5 },
                "comments": [{ "content": "nice" }],
                "tags": [{ "content": "vintage" }, { "content": "vintage" }]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(response).await,
        json!({
            "id": 1,
            "name": "lamp",
            "listing": { "id": 1, "description": "brass desk lamp", "rating": 4.5 },
            "comments": [{ "id": 1, "content": "nice" }],
            "tags": [{ "id": 1, "content": "vintage" }]
        })
    );
}

#[tokio::test]
async fn test_update_replaces_comments_and_tags() {
    let app = TestApp::new();
    app.send(
        Method::POST,
        "/items",
        None,
        Some(json!({
            "name": "lamp",
            "comments": [{ "content": "nice" }, { "content": "heavy" }],
            "tags": [{ "content": "vintage" }]
        })),
    )
    .await;

    let response = app
        .send(
            Method::PATCH,
            "/items/1",
            None,
            Some(json!({
                "listing": { "description": "brass" },
                "comments": [{ "id": 2, "content": "very heavy" }, { "content": "dusty" }],
                "tags": [{ "content": "sale" }]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "lamp");
    assert_eq!(body["listing"], json!({ "id": 1, "description": "brass", "rating": null }));
    assert_eq!(
        body["comments"],
        json!([{ "id": 2, "content": "very heavy" }, { "id": 3, "content": "dusty" }])
    );
    assert_eq!(body["tags"], json!([{ "id": 2, "content": "sale" }]));
}

#[tokio::test]
async fn test_new_listing_without_description_rejected() {
    let app = TestApp::new();
    app.send(Method::POST, "/items", None, Some(json!({ "name": "lamp" })))
        .await;

    let response = app
        .send(
            Method::PATCH,
            "/items/1",
            None,
            Some(json!({ "listing": { "rating": 2.0 } })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["message"],
        "listing description should not be empty"
    );
}

#[tokio::test]
async fn test_non_numeric_item_id() {
    let app = TestApp::new();

    let response = app.send(Method::DELETE, "/items/abc", None, None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_eq!(
        body_json(response).await,
        json!({
            "statusCode": 400,
            "message": "Validation failed (numeric string is expected)",
            "error": "Bad Request"
        })
    );
}
