//! Domain models for the API.
//!
//! These are validated domain objects, separate from database row types and
//! from the JSON request/response shapes in `routes`.

pub mod cart;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, NewCartItem};
pub use product::{Product, ProductDraft};
pub use user::{NewUser, User};

/// Reject `value` if it has more than `max` characters.
fn check_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}
