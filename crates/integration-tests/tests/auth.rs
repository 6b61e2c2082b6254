//! Integration tests for registration, login and bearer token handling.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use secrecy::SecretString;
use serde_json::{Value, json};

use bazaar_api::services::auth::TokenService;
use bazaar_core::UserId;
use bazaar_integration_tests::{TEST_JWT_SECRET, TestApp};

#[tokio::test]
async fn test_health() {
    let (app, _) = TestApp::new();

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.request(Method::GET, "/health/ready", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_customer_then_empty_cart() {
    let (app, _) = TestApp::new();

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "a@x.io",
                "username": "a",
                "password": "longpassword",
                "type": "customer",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["username"], "a");
    assert_eq!(response.body["email"], "a@x.io");
    let token = response.body["token"].as_str().unwrap();

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!([]));
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let (app, _) = TestApp::new();

    for body in [
        json!({"email": "not-an-email", "username": "a", "password": "longpassword", "type": "customer"}),
        json!({"email": "a@x.io", "username": "a", "password": "short", "type": "customer"}),
        json!({"email": "a@x.io", "username": "  ", "password": "longpassword", "type": "customer"}),
        json!({"email": "a@x.io", "username": "a", "password": "longpassword", "type": "wizard"}),
        json!({"email": "a@x.io", "username": "u".repeat(101), "password": "longpassword", "type": "seller"}),
    ] {
        let response = app
            .request(Method::POST, "/api/v1/auth/register", None, Some(body))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.body["error"].is_string());
    }
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (app, _) = TestApp::new();
    app.register("dup@x.io", "customer").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({
                "email": "dup@x.io",
                "username": "other",
                "password": "longpassword",
                "type": "seller",
            })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let (app, _) = TestApp::new();
    app.register("known@x.io", "customer").await;

    let wrong_password = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "known@x.io", "password": "not the password"})),
        )
        .await;
    let unknown_user = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "ghost@x.io", "password": "not the password"})),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_login_returns_working_token() {
    let (app, _) = TestApp::new();
    app.register("login@x.io", "customer").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "login@x.io", "password": "correct horse battery"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["token"].as_str().unwrap();

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(token), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_rejects_bad_tokens() {
    let (app, _) = TestApp::new();
    let token = app.register("t@x.io", "customer").await;

    let missing = app
        .request(Method::GET, "/api/v1/cart/item", None, None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request(Method::GET, "/api/v1/cart/item", Some("not.a.token"), None)
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    let tampered = format!("{token}x");
    let tampered = app
        .request(Method::GET, "/api/v1/cart/item", Some(&tampered), None)
        .await;
    assert_eq!(tampered.status, StatusCode::UNAUTHORIZED);

    let wrong_scheme = app
        .send(
            Request::builder()
                .uri("/api/v1/cart/item")
                .header(header::AUTHORIZATION, format!("Basic {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(wrong_scheme.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let (app, _) = TestApp::new();
    app.register("old@x.io", "customer").await;

    let tokens = TokenService::new(&SecretString::from(TEST_JWT_SECRET), Duration::hours(1));
    let expired = tokens
        .issue_at(UserId::new(1), Utc::now() - Duration::hours(3))
        .unwrap();

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(&expired), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    let (app, _) = TestApp::new();

    let tokens = TokenService::new(&SecretString::from(TEST_JWT_SECRET), Duration::hours(1));
    let orphan = tokens.issue(UserId::new(999)).unwrap();

    let response = app
        .request(Method::GET, "/api/v1/cart/item", Some(&orphan), None)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_json_is_a_json_400() {
    let (app, _) = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(matches!(response.body["error"], Value::String(_)));
}
