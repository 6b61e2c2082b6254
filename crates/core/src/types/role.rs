//! Account roles.

use serde::{Deserialize, Serialize};

/// Error returned when a role string is not one of the known roles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid user type: {0} (expected customer, seller or administrator)")]
pub struct RoleError(pub String);

/// The type of an account, fixed at registration.
///
/// Customers own a cart, sellers own products. Administrators exist in the
/// data model but no route grants them extra capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Shops; owns exactly one cart.
    Customer,
    /// Lists and manages their own products.
    Seller,
    /// Back-office account.
    Administrator,
}

impl UserRole {
    /// The wire/database spelling of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
            Self::Administrator => "administrator",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "administrator" => Ok(Self::Administrator),
            _ => Err(RoleError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_roundtrip() {
        for role in [UserRole::Customer, UserRole::Seller, UserRole::Administrator] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role() {
        assert!("admin".parse::<UserRole>().is_err());
        assert!("Customer".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserRole::Seller).unwrap(),
            "\"seller\""
        );
    }
}
