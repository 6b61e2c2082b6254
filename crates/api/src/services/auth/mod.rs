//! Authentication service.
//!
//! Registration and password login. Both end by issuing a bearer token.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use token::{TokenError, TokenService};

use std::sync::LazyLock;
use std::time::Duration;

use bazaar_core::{Email, UserRole};

use crate::db::{RepositoryError, UserRepository, with_deadline};
use crate::models::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash checked against when the email is unknown, so both login failures
/// cost one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("bazaar-unknown-account").ok());

/// A user together with a freshly issued token.
#[derive(Debug)]
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

/// Authentication service.
///
/// Borrows its collaborators from `AppState` for the length of one request.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
    tokens: &'a TokenService,
    timeout: Duration,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn UserRepository,
        tokens: &'a TokenService,
        timeout: Duration,
    ) -> Self {
        Self {
            users,
            tokens,
            timeout,
        }
    }

    /// Register a new account and issue its first token.
    ///
    /// Customers get a cart atomically with the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail`, `AuthError::InvalidUsername` or
    /// `AuthError::WeakPassword` before anything is stored.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Authenticated, AuthError> {
        let email = Email::parse(email)?;

        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::InvalidUsername("username is required".to_owned()));
        }
        if username.chars().count() > NewUser::MAX_USERNAME_LENGTH {
            return Err(AuthError::InvalidUsername(format!(
                "username must be at most {} characters",
                NewUser::MAX_USERNAME_LENGTH
            )));
        }

        validate_password(password)?;

        let password = password.to_owned();
        let password_hash = blocking(move || hash_password(&password)).await?;

        let user = with_deadline(
            self.timeout,
            self.users.insert(NewUser {
                username: username.to_owned(),
                email,
                role,
                password_hash,
            }),
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");

        Ok(Authenticated { user, token })
    }

    /// Login with email and password.
    ///
    /// An unknown email and a wrong password are indistinguishable to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Authenticated, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let password = password.to_owned();
        let Some((user, password_hash)) =
            with_deadline(self.timeout, self.users.find_by_email(&email)).await?
        else {
            // Same Argon2 cost as a wrong password for a known email.
            blocking(move || {
                if let Some(hash) = DUMMY_HASH.as_deref() {
                    verify_password(&password, hash)?;
                }
                Ok(())
            })
            .await?;
            return Err(AuthError::InvalidCredentials);
        };

        let matches = blocking(move || verify_password(&password, &password_hash)).await?;
        if !matches {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        Ok(Authenticated { user, token })
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Run Argon2 off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|_| AuthError::PasswordHash)?
}
