//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST   /api/v1/auth/register        - Create an account, returns a token
//! POST   /api/v1/auth/login           - Email + password, returns a token
//!
//! # Catalog
//! GET    /api/v1/products             - All products
//! GET    /api/v1/products/{id}        - One product
//! GET    /api/v1/users/{id}/products  - A seller's products
//! POST   /api/v1/products             - Create (seller)
//! PUT    /api/v1/products/{id}        - Replace (owning seller)
//! DELETE /api/v1/products/{id}        - Delete (owning seller)
//!
//! # Cart (customer)
//! GET    /api/v1/cart/item            - List own items
//! POST   /api/v1/cart/item            - Add a product
//! DELETE /api/v1/cart/item            - Empty the cart
//! PATCH  /api/v1/cart/item/{id}       - Change quantity (owning customer)
//! DELETE /api/v1/cart/item/{id}       - Remove (owning customer)
//! ```

pub mod auth;
pub mod cart;
pub mod extract;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/item",
            get(cart::index).post(cart::add).delete(cart::clear),
        )
        .route("/item/{id}", patch(cart::update).delete(cart::remove))
}

/// Create all `/api/v1` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .route("/users/{id}/products", get(products::by_user))
        .nest("/cart", cart_routes())
}
