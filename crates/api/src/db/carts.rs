//! Cart repository.

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};

use bazaar_core::{CartId, UserId};

use super::{RepositoryError, write_error};
use crate::models::Cart;

/// Cart storage. A cart belongs to exactly one customer.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Create the cart for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a cart.
    async fn create(&self, user_id: UserId) -> Result<Cart, RepositoryError>;

    /// Get the cart owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn get(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError>;
}

/// Insert a cart on any executor, so registration can run it inside its
/// transaction.
pub(super) async fn insert_cart<'e, E>(executor: E, user_id: UserId) -> Result<Cart, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let id: CartId = sqlx::query_scalar("INSERT INTO carts (user_id) VALUES ($1) RETURNING id")
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(|e| write_error(e, "user already has a cart"))?;

    Ok(Cart { id, user_id })
}

/// `PostgreSQL` implementation of [`CartRepository`].
#[derive(Clone)]
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        insert_cart(&self.pool, user_id).await
    }

    async fn get(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let id: Option<CartId> = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id.map(|id| Cart { id, user_id }))
    }
}
