//! Cart item routes. All of them act on the caller's own cart.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use bazaar_core::{CartId, CartItemId, ProductId, Quantity};

use super::extract::{ValidJson, ValidPath};
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::CartItem;
use crate::state::AppState;

/// Body for adding a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    #[serde(alias = "productID")]
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Body for changing a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

/// Cart line as returned to clients.
#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
}

impl From<CartItem> for CartItemResponse {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            cart_id: item.cart_id,
            product_id: item.product_id,
            quantity: item.quantity,
            created_at: item.created_at,
        }
    }
}

/// List the caller's cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<CartItemResponse>>> {
    let items = state.carts().list(&user).await?;
    Ok(Json(items.into_iter().map(CartItemResponse::from).collect()))
}

/// Add a product to the caller's cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidJson(body): ValidJson<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItemResponse>)> {
    let item = state
        .carts()
        .add(&user, body.product_id, body.quantity)
        .await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Change the quantity of one of the caller's items.
#[instrument(skip_all, fields(user_id = %user.id, cart_item_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidPath(id): ValidPath<CartItemId>,
    ValidJson(body): ValidJson<UpdateQuantityRequest>,
) -> Result<Json<Value>> {
    state
        .carts()
        .update_quantity(&user, id, body.quantity)
        .await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Remove one of the caller's items.
#[instrument(skip_all, fields(user_id = %user.id, cart_item_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidPath(id): ValidPath<CartItemId>,
) -> Result<StatusCode> {
    state.carts().remove(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Empty the caller's cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<StatusCode> {
    let removed = state.carts().clear(&user).await?;
    tracing::info!(removed, "cart cleared");
    Ok(StatusCode::NO_CONTENT)
}
