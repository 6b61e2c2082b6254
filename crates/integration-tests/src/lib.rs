//! Integration tests for Bazaar.
//!
//! The full router is driven in-process with `tower::ServiceExt::oneshot`
//! against the in-memory repositories, so no database or listener is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Registration, login and bearer token handling
//! - `catalog` - Product ownership rules
//! - `cart` - Cart ownership and quantity rules

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use bazaar_api::config::ApiConfig;
use bazaar_api::db::InMemoryStore;
use bazaar_api::state::{AppState, Repositories};
use bazaar_core::CategoryId;

/// Signing secret shared by the test app and tokens minted by tests.
pub const TEST_JWT_SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%";

/// Build a config suitable for tests.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/bazaar_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        jwt_secret: SecretString::from(TEST_JWT_SECRET),
        db_timeout: Duration::from_secs(3),
        token_ttl: chrono::Duration::hours(1),
        sentry_dsn: None,
    }
}

/// A router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

/// A response with its body decoded as JSON (`Value::Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Build an app with one seeded category.
    #[must_use]
    pub fn new() -> (Self, CategoryId) {
        let store = Arc::new(InMemoryStore::new());
        let category = store.add_category("General");
        let state = AppState::with_repositories(test_config(), Repositories::in_memory(&store));
        (
            Self {
                router: bazaar_api::app(state),
                store,
            },
            category,
        )
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// Send a prepared request.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, body }
    }

    /// Register an account and return its token.
    pub async fn register(&self, email: &str, role: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "email": email,
                    "username": email.split('@').next().unwrap(),
                    "password": "correct horse battery",
                    "type": role,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["token"].as_str().unwrap().to_owned()
    }

    /// Create a product as the given seller and return its id.
    pub async fn create_product(&self, token: &str, category: CategoryId) -> i64 {
        let response = self
            .request(
                Method::POST,
                "/api/v1/products",
                Some(token),
                Some(serde_json::json!({
                    "name": "X",
                    "price": 10,
                    "categoryID": category,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().unwrap()
    }
}
