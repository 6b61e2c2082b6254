//! Integration tests for the product catalog and its ownership rules.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use bazaar_integration_tests::TestApp;

#[tokio::test]
async fn test_seller_creates_and_only_owner_mutates() {
    let (app, category) = TestApp::new();
    let owner = app.register("s1@x.io", "seller").await;
    let rival = app.register("s2@x.io", "seller").await;

    let id = app.create_product(&owner, category).await;
    let path = format!("/api/v1/products/{id}");
    let replacement = json!({"name": "Y", "price": 12.5, "categoryID": category});

    let response = app
        .request(Method::PUT, &path, Some(&rival), Some(replacement.clone()))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request(Method::DELETE, &path, Some(&rival), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(Method::PUT, &path, Some(&owner), Some(replacement))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Y");
    assert_eq!(response.body["price"], 12.5);

    let response = app.request(Method::DELETE, &path, Some(&owner), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request(Method::GET, &path, None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_cannot_create_product() {
    let (app, category) = TestApp::new();
    let customer = app.register("c@x.io", "customer").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(&customer),
            Some(json!({"name": "X", "price": 10, "categoryID": category})),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_product_validation() {
    let (app, category) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;

    for body in [
        json!({"name": "", "price": 10, "categoryID": category}),
        json!({"name": "X", "price": -1, "categoryID": category}),
        json!({"name": "X", "price": 10, "categoryID": 0}),
        json!({"name": "X", "price": 10, "categoryID": 4242}),
        json!({"name": "X", "price": 0.001, "categoryID": category}),
        json!({"name": "X", "price": 10.555, "categoryID": category}),
        json!({"name": "X", "price": 1e11, "categoryID": category}),
        json!({"name": "n".repeat(101), "price": 10, "categoryID": category}),
        json!({"name": "X", "imageURL": "u".repeat(256), "price": 10, "categoryID": category}),
    ] {
        let response = app
            .request(Method::POST, "/api/v1/products", Some(&seller), Some(body))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{:?}", response.body);
    }
}

#[tokio::test]
async fn test_public_listing() {
    let (app, category) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;
    let other = app.register("o@x.io", "seller").await;
    let first = app.create_product(&seller, category).await;
    app.create_product(&other, category).await;

    let response = app.request(Method::GET, "/api/v1/products", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 2);

    let seller_id = response.body[0]["user_id"].as_i64().unwrap();
    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/users/{seller_id}/products"),
            None,
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let listed = response.body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"].as_i64().unwrap(), first);
}

#[tokio::test]
async fn test_missing_resources_are_404() {
    let (app, category) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;

    let response = app
        .request(Method::GET, "/api/v1/products/999", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(
            Method::PUT,
            "/api/v1/products/999",
            Some(&seller),
            Some(json!({"name": "X", "price": 10, "categoryID": category})),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .request(Method::GET, "/api/v1/users/999/products", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_id_is_400() {
    let (app, _) = TestApp::new();

    let response = app
        .request(Method::GET, "/api/v1/products/abc", None, None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}
