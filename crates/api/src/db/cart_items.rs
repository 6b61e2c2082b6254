//! Cart item repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use bazaar_core::{CartId, CartItemId, ProductId, Quantity};

use super::{RepositoryError, write_error};
use crate::models::{CartItem, NewCartItem};

/// Storage for cart lines.
#[async_trait]
pub trait CartItemRepository: Send + Sync {
    /// Add a line to a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the cart or product
    /// does not exist.
    async fn create(&self, item: NewCartItem) -> Result<CartItem, RepositoryError>;

    /// Get a single line by ID, whatever cart it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn get_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError>;

    /// List every line in a cart, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn get_all_by_cart_id(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError>;

    /// Set a line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    async fn update_quantity(
        &self,
        id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError>;

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    async fn delete_item(&self, id: CartItemId) -> Result<(), RepositoryError>;

    /// Remove every line in a cart, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn delete_all(&self, cart_id: CartId) -> Result<u64, RepositoryError>;
}

/// Internal row type for cart item queries.
#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    cart_id: CartId,
    product_id: ProductId,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(row.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart item {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            cart_id: row.cart_id,
            product_id: row.product_id,
            quantity,
            created_at: row.created_at,
        })
    }
}

/// `PostgreSQL` implementation of [`CartItemRepository`].
#[derive(Clone)]
pub struct PgCartItemRepository {
    pool: PgPool,
}

impl PgCartItemRepository {
    /// Create a new cart item repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartItemRepository for PgCartItemRepository {
    async fn create(&self, item: NewCartItem) -> Result<CartItem, RepositoryError> {
        let row: CartItemRow = sqlx::query_as(
            r"
            INSERT INTO cart_items (cart_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, cart_id, product_id, quantity, created_at
            ",
        )
        .bind(item.cart_id)
        .bind(item.product_id)
        .bind(item.quantity.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "duplicate cart item"))?;

        row.try_into()
    }

    async fn get_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        let row: Option<CartItemRow> = sqlx::query_as(
            r"
            SELECT id, cart_id, product_id, quantity, created_at
            FROM cart_items
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CartItem::try_from).transpose()
    }

    async fn get_all_by_cart_id(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows: Vec<CartItemRow> = sqlx::query_as(
            r"
            SELECT id, cart_id, product_id, quantity, created_at
            FROM cart_items
            WHERE cart_id = $1
            ORDER BY id
            ",
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartItem::try_from).collect()
    }

    async fn update_quantity(
        &self,
        id: CartItemId,
        quantity: Quantity,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE cart_items SET quantity = $1 WHERE id = $2")
            .bind(quantity.get())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_item(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_all(&self, cart_id: CartId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
