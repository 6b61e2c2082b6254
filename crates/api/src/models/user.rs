//! User domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{Email, UserId, UserRole};

use super::{Cart, check_length};

/// A registered account.
///
/// Never carries the password hash; only the login lookup sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Unique email address, also the login key.
    pub email: Email,
    /// Account type, fixed at registration.
    pub role: UserRole,
    /// The user's cart (customers only), preloaded on lookup.
    pub cart: Option<Cart>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether this user has the given role.
    #[must_use]
    pub fn is(&self, role: UserRole) -> bool {
        self.role == role
    }
}

/// A validated registration, ready to persist.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Email,
    pub role: UserRole,
    /// Argon2 PHC string.
    pub password_hash: String,
}

impl NewUser {
    /// Maximum characters in a username.
    pub const MAX_USERNAME_LENGTH: usize = 100;

    /// Check the username fits its column.
    ///
    /// # Errors
    ///
    /// Returns a message if the username is too long.
    pub fn check_lengths(&self) -> Result<(), String> {
        check_length("username", &self.username, Self::MAX_USERNAME_LENGTH)
    }
}
