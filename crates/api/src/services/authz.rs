//! Authorization rules.
//!
//! Pure checks over already-loaded state. Each check runs before any
//! mutation, and ownership is always judged against the persisted record,
//! never against ids the client sent.

use thiserror::Error;

use bazaar_core::UserRole;

use crate::models::{CartItem, Product, User};

/// Why a principal may not perform an operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthzError {
    /// Role or ownership mismatch.
    #[error("forbidden")]
    Forbidden,

    /// The resource being authorized does not exist.
    #[error("not found")]
    NotFound,
}

/// Require the principal to have `role`.
///
/// # Errors
///
/// Returns `AuthzError::Forbidden` on a role mismatch.
pub fn require_role(principal: &User, role: UserRole) -> Result<(), AuthzError> {
    if principal.is(role) {
        return Ok(());
    }
    tracing::warn!(
        user_id = %principal.id,
        role = %principal.role,
        required = %role,
        "role check failed"
    );
    Err(AuthzError::Forbidden)
}

/// Authorize an update or delete of `product`.
///
/// Existence is checked first. The principal must then both own the product
/// and be a seller.
///
/// # Errors
///
/// Returns `AuthzError::NotFound` if the product is missing, and
/// `AuthzError::Forbidden` if the principal is not its selling owner.
pub fn authorize_product_mutation(
    principal: &User,
    product: Option<Product>,
) -> Result<Product, AuthzError> {
    let product = product.ok_or(AuthzError::NotFound)?;

    if principal.id != product.seller_id || !principal.is(UserRole::Seller) {
        tracing::warn!(
            user_id = %principal.id,
            product_id = %product.id,
            owner_id = %product.seller_id,
            "product ownership check failed"
        );
        return Err(AuthzError::Forbidden);
    }

    Ok(product)
}

/// Authorize access to a cart item.
///
/// The item must sit in the principal's own cart. A principal without a cart
/// owns no items.
///
/// # Errors
///
/// Returns `AuthzError::NotFound` if the item is missing, and
/// `AuthzError::Forbidden` if it belongs to another cart.
pub fn authorize_cart_item(principal: &User, item: Option<CartItem>) -> Result<CartItem, AuthzError> {
    let item = item.ok_or(AuthzError::NotFound)?;

    let owns = principal.cart.is_some_and(|cart| cart.id == item.cart_id);
    if !owns {
        tracing::warn!(
            user_id = %principal.id,
            cart_item_id = %item.id,
            cart_id = %item.cart_id,
            "cart item ownership check failed"
        );
        return Err(AuthzError::Forbidden);
    }

    Ok(item)
}
