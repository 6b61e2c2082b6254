//! Product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use bazaar_core::{CategoryId, Price, ProductId, UserId};

use super::{RepositoryError, write_error};
use crate::models::{Product, ProductDraft};

/// Catalog storage.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a product owned by `seller_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the category does not
    /// exist.
    async fn create(
        &self,
        seller_id: UserId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError>;

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// List the whole catalog in ID order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// List the products owned by one seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn get_all_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, RepositoryError>;

    /// Replace a product's editable fields, keeping its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn update(&self, id: ProductId, draft: &ProductDraft)
    -> Result<Product, RepositoryError>;

    /// Delete a product. Cart lines pointing at it go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;
}

/// Internal row type for product queries.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    category_id: CategoryId,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price)
            .map_err(|e| RepositoryError::DataCorruption(format!("product {}: {e}", row.id)))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price,
            image_url: row.image_url,
            category_id: row.category_id,
            seller_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image_url, category_id, user_id, created_at";

/// `PostgreSQL` implementation of [`ProductRepository`].
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(
        &self,
        seller_id: UserId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r"
            INSERT INTO products (name, description, price, image_url, category_id, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price.amount())
        .bind(&draft.image_url)
        .bind(draft.category_id)
        .bind(seller_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "duplicate product"))?;

        row.try_into()
    }

    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    async fn get_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_all_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = $1 ORDER BY id"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE products
            SET name = $1, description = $2, price = $3, image_url = $4, category_id = $5
            WHERE id = $6
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price.amount())
        .bind(&draft.image_url)
        .bind(draft.category_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "duplicate product"))?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
