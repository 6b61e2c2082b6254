//! Integration tests for cart items and their ownership rules.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use bazaar_integration_tests::TestApp;

async fn add_item(app: &TestApp, token: &str, product_id: i64, quantity: i64) -> i64 {
    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/item",
            Some(token),
            Some(json!({"productID": product_id, "quantity": quantity})),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["quantity"], quantity);
    response.body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_cart_lifecycle() {
    let (app, category) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;
    let customer = app.register("c@x.io", "customer").await;
    let product = app.create_product(&seller, category).await;

    let item = add_item(&app, &customer, product, 2).await;
    let path = format!("/api/v1/cart/item/{item}");

    let response = app
        .request(Method::PATCH, &path, Some(&customer), Some(json!({"quantity": 5})))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"status": "ok"}));

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(&customer), None)
        .await;
    let items = response.body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 5);
    assert_eq!(items[0]["product_id"].as_i64().unwrap(), product);

    let response = app.request(Method::DELETE, &path, Some(&customer), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app.request(Method::DELETE, &path, Some(&customer), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_foreign_cart_item_is_forbidden() {
    let (app, category) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;
    let alice = app.register("alice@x.io", "customer").await;
    let bob = app.register("bob@x.io", "customer").await;
    let product = app.create_product(&seller, category).await;

    let item = add_item(&app, &alice, product, 1).await;
    let path = format!("/api/v1/cart/item/{item}");

    let response = app
        .request(Method::PATCH, &path, Some(&bob), Some(json!({"quantity": 3})))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request(Method::DELETE, &path, Some(&bob), None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(&bob), None)
        .await;
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_non_positive_quantity_is_400() {
    let (app, category) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;
    let customer = app.register("c@x.io", "customer").await;
    let product = app.create_product(&seller, category).await;

    for quantity in [0, -1] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/cart/item",
                Some(&customer),
                Some(json!({"productID": product, "quantity": quantity})),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let item = add_item(&app, &customer, product, 1).await;
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/cart/item/{item}"),
            Some(&customer),
            Some(json!({"quantity": 0})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_product_is_400() {
    let (app, _) = TestApp::new();
    let customer = app.register("c@x.io", "customer").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart/item",
            Some(&customer),
            Some(json!({"productID": 999, "quantity": 1})),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_seller_has_no_cart() {
    let (app, _) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(&seller), None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_non_customers_cannot_touch_cart_items() {
    let (app, _) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;
    let admin = app.register("admin@x.io", "administrator").await;

    for token in [seller.as_str(), admin.as_str()] {
        let response = app
            .request(
                Method::PATCH,
                "/api/v1/cart/item/999",
                Some(token),
                Some(json!({"quantity": 2})),
            )
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);

        let response = app
            .request(Method::DELETE, "/api/v1/cart/item/999", Some(token), None)
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_clear_and_product_delete_cascade() {
    let (app, category) = TestApp::new();
    let seller = app.register("s@x.io", "seller").await;
    let customer = app.register("c@x.io", "customer").await;
    let first = app.create_product(&seller, category).await;
    let second = app.create_product(&seller, category).await;

    add_item(&app, &customer, first, 1).await;
    add_item(&app, &customer, second, 1).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/products/{first}"),
            Some(&seller),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(&customer), None)
        .await;
    assert_eq!(response.body.as_array().unwrap().len(), 1);

    let response = app
        .request(Method::DELETE, "/api/v1/cart/item", Some(&customer), None)
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(&customer), None)
        .await;
    assert_eq!(response.body, json!([]));
}
