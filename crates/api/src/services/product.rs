//! Catalog operations.

use std::time::Duration;

use bazaar_core::{ProductId, UserId, UserRole};

use super::ServiceError;
use super::authz::{authorize_product_mutation, require_role};
use crate::db::{ProductRepository, UserRepository, with_deadline};
use crate::models::{Product, ProductDraft, User};

/// Catalog reads for anyone, mutations for the owning seller.
pub struct ProductService<'a> {
    products: &'a dyn ProductRepository,
    users: &'a dyn UserRepository,
    timeout: Duration,
}

impl<'a> ProductService<'a> {
    /// Create a new product service.
    #[must_use]
    pub const fn new(
        products: &'a dyn ProductRepository,
        users: &'a dyn UserRepository,
        timeout: Duration,
    ) -> Self {
        Self {
            products,
            users,
            timeout,
        }
    }

    /// List the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the lookup fails.
    pub async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(with_deadline(self.timeout, self.products.get_all()).await?)
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product, ServiceError> {
        with_deadline(self.timeout, self.products.get_by_id(id))
            .await?
            .ok_or(ServiceError::NotFound("product"))
    }

    /// List the products a seller owns.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    pub async fn list_by_seller(&self, seller_id: UserId) -> Result<Vec<Product>, ServiceError> {
        if with_deadline(self.timeout, self.users.find_by_id(seller_id))
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound("user"));
        }

        Ok(with_deadline(self.timeout, self.products.get_all_by_seller(seller_id)).await?)
    }

    /// Create a product owned by the principal.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the principal is not a seller.
    pub async fn create(&self, principal: &User, draft: &ProductDraft) -> Result<Product, ServiceError> {
        require_role(principal, UserRole::Seller).map_err(|e| ServiceError::denied(e, "product"))?;

        let product = with_deadline(self.timeout, self.products.create(principal.id, draft)).await?;
        tracing::info!(user_id = %principal.id, product_id = %product.id, "product created");
        Ok(product)
    }

    /// Replace the editable fields of a product the principal owns.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist and
    /// `ServiceError::Forbidden` if the principal is not its selling owner.
    pub async fn update(
        &self,
        principal: &User,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ServiceError> {
        self.owned(principal, id).await?;

        let product = with_deadline(self.timeout, self.products.update(id, draft)).await?;
        tracing::info!(user_id = %principal.id, product_id = %id, "product updated");
        Ok(product)
    }

    /// Delete a product the principal owns.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist and
    /// `ServiceError::Forbidden` if the principal is not its selling owner.
    pub async fn delete(&self, principal: &User, id: ProductId) -> Result<(), ServiceError> {
        self.owned(principal, id).await?;

        with_deadline(self.timeout, self.products.delete(id)).await?;
        tracing::info!(user_id = %principal.id, product_id = %id, "product deleted");
        Ok(())
    }

    async fn owned(&self, principal: &User, id: ProductId) -> Result<Product, ServiceError> {
        let product = with_deadline(self.timeout, self.products.get_by_id(id)).await?;
        authorize_product_mutation(principal, product).map_err(|e| ServiceError::denied(e, "product"))
    }
}
