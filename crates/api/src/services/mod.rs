//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password hashing, bearer tokens, registration and login
//! - `authz` - Role and ownership rules
//! - `cart` - Cart item operations for customers
//! - `product` - Catalog reads and seller-owned mutations
//!
//! Services borrow their repositories from `AppState` and wrap every
//! repository call in the configured deadline.

pub mod auth;
pub mod authz;
pub mod cart;
pub mod product;

use thiserror::Error;

use crate::db::RepositoryError;
use authz::AuthzError;

pub use cart::CartService;
pub use product::ProductService;

/// Errors from the cart and product services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request is well-formed JSON but semantically invalid.
    #[error("{0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The principal may not perform this operation.
    #[error("forbidden")]
    Forbidden,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl ServiceError {
    /// Attach the resource name to an authorization failure.
    pub(crate) const fn denied(e: AuthzError, resource: &'static str) -> Self {
        match e {
            AuthzError::Forbidden => Self::Forbidden,
            AuthzError::NotFound => Self::NotFound(resource),
        }
    }
}
