//! Catalog domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{CategoryId, Price, ProductId, UserId};

use super::check_length;

/// A catalog entry owned by a seller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub category_id: CategoryId,
    /// The seller who created the product; only they may change it.
    pub seller_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Validated, seller-editable product fields.
///
/// Used both to create a product and to replace an existing one's fields;
/// ownership and creation time are never client-supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub category_id: CategoryId,
}

impl ProductDraft {
    /// Maximum characters in a product name.
    pub const MAX_NAME_LENGTH: usize = 100;
    /// Maximum characters in the description and the image URL.
    pub const MAX_TEXT_LENGTH: usize = 255;

    /// Check the text fields fit their columns.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first field that is too long.
    pub fn check_lengths(&self) -> Result<(), String> {
        check_length("name", &self.name, Self::MAX_NAME_LENGTH)?;
        check_length("description", &self.description, Self::MAX_TEXT_LENGTH)?;
        check_length("image_url", &self.image_url, Self::MAX_TEXT_LENGTH)
    }
}
