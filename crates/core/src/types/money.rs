//! Non-negative monetary amounts using decimal arithmetic.
//!
//! The shop trades in a single currency, so a [`Money`] is just a checked
//! [`Decimal`]. Arithmetic never goes through floats.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Money`] amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The input is not a decimal number.
    #[error("invalid amount: {0}")]
    Invalid(String),
    /// More than two decimal places.
    #[error("amount cannot have fractions of a cent")]
    SubCent,
    /// At or above [`Money::LIMIT`].
    #[error("amount must be below 10000000000")]
    TooLarge,
}

/// A non-negative amount of money.
///
/// ```
/// use jewelbox_core::Money;
///
/// let ring = Money::parse("100").unwrap();
/// let box_ = Money::parse("10.00").unwrap();
/// assert_eq!((ring + box_) * 2, Money::parse("220").unwrap());
/// assert_eq!(Money::parse("220").unwrap().to_string(), "$220.00");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Exclusive upper bound; amounts are stored as `NUMERIC(12, 2)`.
    pub const LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

    /// Wrap a decimal amount of whole cents.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if `amount` is below zero,
    /// [`MoneyError::SubCent`] if it has more than two significant decimal
    /// places and [`MoneyError::TooLarge`] if it is not below [`Money::LIMIT`].
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        if amount.normalize().scale() > 2 {
            return Err(MoneyError::SubCent);
        }
        if amount >= Self::LIMIT {
            return Err(MoneyError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Parse a decimal string such as `"1299.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a decimal or is negative.
    pub fn parse(s: &str) -> Result<Self, MoneyError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| MoneyError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round to whole cents, half away from zero.
    #[must_use]
    pub fn round_cents(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Multiply by a non-negative rate (e.g. a tax rate of `0.18`).
    #[must_use]
    pub fn scale(self, rate: Decimal) -> Self {
        if rate.is_sign_negative() {
            return Self::ZERO;
        }
        Self(self.0 * rate)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Money::parse("-1"), Err(MoneyError::Negative));
        assert!(Money::parse("-0").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Money::parse("ten"), Err(MoneyError::Invalid(_))));
        assert!(matches!(Money::parse(""), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Money::parse("5").unwrap().to_string(), "$5.00");
        assert_eq!(Money::parse("1299.5").unwrap().to_string(), "$1299.50");
    }

    #[test]
    fn test_round_cents_half_away_from_zero() {
        let ten = Money::parse("10").unwrap();
        assert_eq!(
            ten.scale(Decimal::new(1005, 4)).round_cents(),
            Money::parse("1.01").unwrap()
        );
        assert_eq!(
            ten.scale(Decimal::new(1004, 4)).round_cents(),
            Money::parse("1.00").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_sub_cent_amounts() {
        assert_eq!(Money::parse("1.239"), Err(MoneyError::SubCent));
        assert!(Money::parse("1.2300").is_ok());
    }

    #[test]
    fn test_parse_rejects_amounts_the_column_cannot_hold() {
        assert_eq!(
            Money::parse("123456789012345.678"),
            Err(MoneyError::SubCent)
        );
        assert_eq!(
            Money::parse("123456789012345.67"),
            Err(MoneyError::TooLarge)
        );
        assert_eq!(Money::parse("10000000000"), Err(MoneyError::TooLarge));
        assert!(Money::parse("9999999999.99").is_ok());
    }

    #[test]
    fn test_scale_with_negative_rate_is_zero() {
        let m = Money::parse("100").unwrap();
        assert_eq!(m.scale(Decimal::new(-5, 2)), Money::ZERO);
        assert_eq!(m.scale(Decimal::new(18, 2)), Money::parse("18").unwrap());
    }

    #[test]
    fn test_sum() {
        let total: Money = ["1.10", "2.20", "3.30"]
            .iter()
            .map(|s| Money::parse(s).unwrap())
            .sum();
        assert_eq!(total, Money::parse("6.60").unwrap());
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_strings() {
        let a: Money = serde_json::from_str("12.5").unwrap();
        let b: Money = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<Money>("-3").is_err());
        assert!(serde_json::from_str::<Money>("\"0.001\"").is_err());
    }
}
