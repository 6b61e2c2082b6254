//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use bazaar_core::{CartId, Email, UserId, UserRole};

use super::{RepositoryError, carts, write_error};
use crate::models::{Cart, NewUser, User};

/// Account storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account.
    ///
    /// Customers get their cart in the same transaction, so a customer never
    /// exists without one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Get a user by ID, with their cart preloaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user and their stored password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database query fails.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}

/// Internal row type for user queries.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: Email,
    role: UserRole,
    created_at: DateTime<Utc>,
    cart_id: Option<CartId>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            role: row.role,
            cart: row.cart_id.map(|id| Cart {
                id,
                user_id: row.id,
            }),
            created_at: row.created_at,
        }
    }
}

/// Row type for the login lookup, which also reads the hash.
#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

const SELECT_USER: &str = r"
    SELECT u.id, u.username, u.email, u.role, u.created_at, c.id AS cart_id
    FROM users u
    LEFT JOIN carts c ON c.user_id = u.id
";

const SELECT_CREDENTIALS: &str = r"
    SELECT u.id, u.username, u.email, u.role, u.created_at, c.id AS cart_id, u.password
    FROM users u
    LEFT JOIN carts c ON c.user_id = u.id
";

/// `PostgreSQL` implementation of [`UserRepository`].
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tx: Transaction<'_, Postgres> = self.pool.begin().await?;

        let (id, created_at): (UserId, DateTime<Utc>) = sqlx::query_as(
            r"
            INSERT INTO users (username, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            ",
        )
        .bind(&user.username)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "email already registered"))?;

        let cart = if user.role == UserRole::Customer {
            Some(carts::insert_cart(&mut *tx, id).await?)
        } else {
            None
        };

        tx.commit().await?;

        Ok(User {
            id,
            username: user.username,
            email: user.email,
            role: user.role,
            cart,
            created_at,
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row: Option<CredentialRow> =
            sqlx::query_as(&format!("{SELECT_CREDENTIALS} WHERE u.email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| (User::from(r.user), r.password)))
    }
}
