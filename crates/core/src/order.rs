//! Order-side rules: shipping address validation and totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::Money;

/// Payment method recorded when the client does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "Razorpay";

/// A required address field was blank.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("shipping {0} is required")]
pub struct AddressError(pub &'static str);

/// Where an order ships to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

impl ShippingAddress {
    /// Trim every field and reject blanks.
    ///
    /// # Errors
    ///
    /// Returns the first blank field, in form order.
    pub fn validate(self) -> Result<Self, AddressError> {
        let address = required(self.address, "address")?;
        let city = required(self.city, "city")?;
        let postal_code = required(self.postal_code, "postal code")?;
        let country = required(self.country, "country")?;
        Ok(Self {
            address,
            city,
            postal_code,
            country,
        })
    }
}

fn required(value: String, field: &'static str) -> Result<String, AddressError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AddressError(field));
    }
    Ok(trimmed.to_owned())
}

/// Store-wide tax and shipping settings applied at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Fraction of the items price, e.g. `0.18`.
    pub tax_rate: Decimal,
    /// Flat shipping charge per order.
    pub shipping_price: Money,
}

/// Computed order amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub items_price: Money,
    pub tax_price: Money,
    pub shipping_price: Money,
    pub total_price: Money,
}

impl OrderTotals {
    /// Price a cart under `policy`. Tax is rounded to cents.
    #[must_use]
    pub fn compute(cart: &Cart, policy: &PricingPolicy) -> Self {
        let items_price = cart.total();
        let tax_price = items_price.scale(policy.tax_rate).round_cents();
        let shipping_price = policy.shipping_price;
        Self {
            items_price,
            tax_price,
            shipping_price,
            total_price: items_price + tax_price + shipping_price,
        }
    }
}
