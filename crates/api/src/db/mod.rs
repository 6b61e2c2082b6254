//! Persistence for the API.
//!
//! # Database
//!
//! ## Tables
//!
//! - `users` - Accounts (email unique, role enum, argon2 password hash)
//! - `carts` - One per customer, cascade-deleted with the user
//! - `cart_items` - Lines in a cart
//! - `categories` - Reference data (managed through `bazaar-cli`)
//! - `products` - Catalog entries owned by a seller
//! - `orders`, `order_items` - Schema only
//!
//! # Repositories
//!
//! Each entity sits behind an `async_trait` repository trait with a
//! `PostgreSQL` implementation. [`memory::InMemoryStore`] implements all of
//! them for tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate
//! ```

pub mod cart_items;
pub mod carts;
pub mod memory;
pub mod products;
pub mod users;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart_items::{CartItemRepository, PgCartItemRepository};
pub use carts::{CartRepository, PgCartRepository};
pub use memory::InMemoryStore;
pub use products::{PgProductRepository, ProductRepository};
pub use users::{PgUserRepository, UserRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A foreign key points at a row that does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// A value does not fit its column (check, length or range).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The call did not finish within the configured deadline.
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run a repository call under a deadline.
///
/// Dropping the returned future (for example when the client disconnects)
/// cancels the underlying call as well.
///
/// # Errors
///
/// Returns `RepositoryError::DeadlineExceeded` if `limit` elapses first, and
/// otherwise whatever the call itself returned.
pub async fn with_deadline<T, F>(limit: Duration, call: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| RepositoryError::DeadlineExceeded(limit))?
}

/// SQLSTATE for a string longer than its `VARCHAR` column.
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
/// SQLSTATE for a number outside its `NUMERIC` column's range.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Classify a failed write.
fn write_error(e: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            let constraint = db_err.constraint().unwrap_or("foreign key").to_owned();
            return RepositoryError::InvalidReference(constraint);
        }
        if db_err.is_check_violation() {
            let constraint = db_err.constraint().unwrap_or("check").to_owned();
            return RepositoryError::InvalidValue(constraint);
        }
        if matches!(
            db_err.code().as_deref(),
            Some(STRING_DATA_RIGHT_TRUNCATION | NUMERIC_VALUE_OUT_OF_RANGE)
        ) {
            return RepositoryError::InvalidValue(db_err.message().to_owned());
        }
    }
    RepositoryError::Database(e)
}
