//! Type-safe product price using decimal arithmetic.

use rust_decimal::Decimal;
use serde::Serialize;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Prices must be strictly positive.
    #[error("price must be greater than 0")]
    NotPositive,
    /// More than two decimal places.
    #[error("price must have at most {} decimal places", Price::MAX_SCALE)]
    TooPrecise,
    /// Too many integer digits.
    #[error("price must be less than 10000000000")]
    TooLarge,
}

/// A catalog price, always greater than zero.
///
/// Prices are exact to the cent and stay below 10^10, matching the
/// `NUMERIC(12, 2)` column they are stored in.
///
/// Serialized as a JSON number so clients see `10.5`, not `"10.5"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Price {
    /// Maximum number of decimal places.
    pub const MAX_SCALE: u32 = 2;

    /// Exclusive upper bound (ten integer digits).
    const UPPER_BOUND: i64 = 10_000_000_000;

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotPositive` for zero or negative amounts,
    /// `PriceError::TooPrecise` for fractions of a cent and
    /// `PriceError::TooLarge` for amounts of 10^10 or more.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        if amount.normalize().scale() > Self::MAX_SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount >= Decimal::from(Self::UPPER_BOUND) {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_and_negative() {
        assert_eq!(Price::new(Decimal::ZERO), Err(PriceError::NotPositive));
        assert_eq!(Price::new(Decimal::new(-1, 0)), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_cent_precision() {
        assert!(Price::new(Decimal::new(1055, 2)).is_ok());
        assert!(Price::new(Decimal::new(10_500, 3)).is_ok());
        assert_eq!(Price::new(Decimal::new(1, 3)), Err(PriceError::TooPrecise));
        assert_eq!(Price::new(Decimal::new(10_555, 3)), Err(PriceError::TooPrecise));
    }

    #[test]
    fn test_upper_bound() {
        assert!(Price::new(Decimal::new(999_999_999_999, 2)).is_ok());
        assert_eq!(
            Price::new(Decimal::new(10_000_000_000, 0)),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Price::new(Decimal::new(100_000_000_000, 0)),
            Err(PriceError::TooLarge)
        );
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::new(Decimal::new(1050, 2)).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "10.5");
    }

    #[test]
    fn test_display_two_places() {
        let price = Price::new(Decimal::new(10, 0)).unwrap();
        assert_eq!(price.to_string(), "10.00");
    }
}
