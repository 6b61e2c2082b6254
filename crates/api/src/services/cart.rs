//! Cart item operations.

use std::time::Duration;

use bazaar_core::{CartItemId, ProductId, Quantity, UserRole};

use super::ServiceError;
use super::authz::{authorize_cart_item, require_role};
use crate::db::{CartItemRepository, CartRepository, ProductRepository, with_deadline};
use crate::models::{Cart, CartItem, NewCartItem, User};

/// Cart operations on behalf of an authenticated customer.
pub struct CartService<'a> {
    carts: &'a dyn CartRepository,
    items: &'a dyn CartItemRepository,
    products: &'a dyn ProductRepository,
    timeout: Duration,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(
        carts: &'a dyn CartRepository,
        items: &'a dyn CartItemRepository,
        products: &'a dyn ProductRepository,
        timeout: Duration,
    ) -> Self {
        Self {
            carts,
            items,
            products,
            timeout,
        }
    }

    /// List the items in the principal's cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the principal is not a customer.
    pub async fn list(&self, principal: &User) -> Result<Vec<CartItem>, ServiceError> {
        require_role(principal, UserRole::Customer).map_err(|e| ServiceError::denied(e, "cart"))?;

        let Some(cart) = principal.cart else {
            return Ok(Vec::new());
        };

        Ok(with_deadline(self.timeout, self.items.get_all_by_cart_id(cart.id)).await?)
    }

    /// Add a product to the principal's cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the principal is not a customer, and
    /// `ServiceError::Validation` for a non-positive quantity or an unknown
    /// product.
    pub async fn add(
        &self,
        principal: &User,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItem, ServiceError> {
        require_role(principal, UserRole::Customer).map_err(|e| ServiceError::denied(e, "cart"))?;
        let quantity = Quantity::new(quantity).map_err(|e| ServiceError::Validation(e.to_string()))?;

        let product = with_deadline(self.timeout, self.products.get_by_id(product_id)).await?;
        if product.is_none() {
            return Err(ServiceError::Validation(format!(
                "product {product_id} does not exist"
            )));
        }

        let cart = self.cart_for(principal).await?;
        let item = with_deadline(
            self.timeout,
            self.items.create(NewCartItem {
                cart_id: cart.id,
                product_id,
                quantity,
            }),
        )
        .await?;

        tracing::info!(
            user_id = %principal.id,
            cart_item_id = %item.id,
            product_id = %product_id,
            "added to cart"
        );
        Ok(item)
    }

    /// Change the quantity of an item in the principal's cart.
    ///
    /// The role and quantity are checked before anything is read or written.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the principal is not a customer or
    /// the item is in someone else's cart, `ServiceError::Validation` for a
    /// non-positive quantity and `ServiceError::NotFound` if the item does not
    /// exist.
    pub async fn update_quantity(
        &self,
        principal: &User,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        require_role(principal, UserRole::Customer).map_err(|e| ServiceError::denied(e, "cart"))?;
        let quantity = Quantity::new(quantity).map_err(|e| ServiceError::Validation(e.to_string()))?;

        self.owned_item(principal, item_id).await?;
        with_deadline(self.timeout, self.items.update_quantity(item_id, quantity)).await?;
        Ok(())
    }

    /// Remove one item from the principal's cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the principal is not a customer or
    /// the item is in someone else's cart, and `ServiceError::NotFound` if the
    /// item does not exist.
    pub async fn remove(&self, principal: &User, item_id: CartItemId) -> Result<(), ServiceError> {
        require_role(principal, UserRole::Customer).map_err(|e| ServiceError::denied(e, "cart"))?;
        self.owned_item(principal, item_id).await?;
        with_deadline(self.timeout, self.items.delete_item(item_id)).await?;
        Ok(())
    }

    /// Empty the principal's cart, returning how many items were removed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` if the principal is not a customer.
    pub async fn clear(&self, principal: &User) -> Result<u64, ServiceError> {
        require_role(principal, UserRole::Customer).map_err(|e| ServiceError::denied(e, "cart"))?;

        let Some(cart) = principal.cart else {
            return Ok(0);
        };

        Ok(with_deadline(self.timeout, self.items.delete_all(cart.id)).await?)
    }

    /// Load an item and check it belongs to the principal's cart.
    async fn owned_item(&self, principal: &User, item_id: CartItemId) -> Result<CartItem, ServiceError> {
        let item = with_deadline(self.timeout, self.items.get_item(item_id)).await?;
        authorize_cart_item(principal, item).map_err(|e| ServiceError::denied(e, "cart item"))
    }

    /// The principal's cart, created on first use if the account predates
    /// atomic registration.
    async fn cart_for(&self, principal: &User) -> Result<Cart, ServiceError> {
        if let Some(cart) = principal.cart {
            return Ok(cart);
        }

        if let Some(cart) = with_deadline(self.timeout, self.carts.get(principal.id)).await? {
            return Ok(cart);
        }

        tracing::info!(user_id = %principal.id, "creating missing cart");
        Ok(with_deadline(self.timeout, self.carts.create(principal.id)).await?)
    }
}
