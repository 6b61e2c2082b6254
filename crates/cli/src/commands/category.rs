//! Product category management.
//!
//! Categories are reference data: products must point at an existing one,
//! and no API route creates them.
//!
//! # Usage
//!
//! ```bash
//! bazaar-cli category create --name "Kitchen"
//! bazaar-cli category list
//! ```

use bazaar_core::CategoryId;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Maximum length of a category name (matches the `categories.name` column).
const MAX_NAME_LENGTH: usize = 100;

/// Errors that can occur during category operations.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid name.
    #[error("Invalid category name: {0}")]
    InvalidName(String),
}

/// Validate and normalize a category name.
fn validate_name(name: &str) -> Result<&str, CategoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CategoryError::InvalidName("name cannot be empty".to_owned()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CategoryError::InvalidName(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

async fn connect() -> Result<PgPool, CategoryError> {
    let database_url =
        super::database_url().ok_or(CategoryError::MissingEnvVar("BAZAAR_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(PgPool::connect(database_url.expose_secret()).await?)
}

/// Create a category.
///
/// # Returns
///
/// The ID of the created category.
///
/// # Errors
///
/// Returns `CategoryError` if the name is invalid or the insert fails.
pub async fn create(name: &str) -> Result<CategoryId, CategoryError> {
    let name = validate_name(name)?;
    let pool = connect().await?;

    let id: CategoryId = sqlx::query_scalar("INSERT INTO categories (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&pool)
        .await?;

    tracing::info!("Category created! ID: {}, Name: {}", id, name);
    Ok(id)
}

/// List every category in ID order.
///
/// # Errors
///
/// Returns `CategoryError` if the query fails.
pub async fn list() -> Result<Vec<(CategoryId, String)>, CategoryError> {
    let pool = connect().await?;

    let categories: Vec<(CategoryId, String)> =
        sqlx::query_as("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&pool)
            .await?;

    if categories.is_empty() {
        tracing::info!("No categories yet");
    }
    for (id, name) in &categories {
        tracing::info!("{id}\t{name}");
    }

    Ok(categories)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Kitchen ").unwrap(), "Kitchen");
        assert!(matches!(
            validate_name("   "),
            Err(CategoryError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name(&"x".repeat(101)),
            Err(CategoryError::InvalidName(_))
        ));
    }
}
