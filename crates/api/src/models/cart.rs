//! Cart domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{CartId, CartItemId, ProductId, Quantity, UserId};

/// A customer's cart. Each customer owns at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
}

/// A line in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
}

/// A line to add to a cart.
#[derive(Debug, Clone, Copy)]
pub struct NewCartItem {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
}
