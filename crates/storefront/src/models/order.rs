//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use jewelbox_core::order::ShippingAddress;
use jewelbox_core::{Email, Money, OrderId, PackagingSelection, ProductId, UserId};

/// The account an order belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCustomer {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// A line copied from the cart at checkout.
///
/// `product_id` is cleared if the product is later deleted; the name, image
/// and prices stay as they were when the order was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(rename = "product")]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub image: Option<String>,
    #[serde(rename = "price")]
    pub unit_price: Money,
    #[serde(rename = "qty")]
    pub quantity: i32,
    pub packaging: Option<PackagingSelection>,
    pub packaging_price: Money,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        let quantity = u32::try_from(self.quantity).unwrap_or(0);
        (self.unit_price + self.packaging_price) * quantity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: OrderCustomer,
    #[serde(rename = "orderItems")]
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: Money,
    pub tax_price: Money,
    pub shipping_price: Money,
    pub total_price: Money,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub const fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user.id.as_i32() == user_id.as_i32()
    }

    #[must_use]
    pub fn item_count(&self) -> i32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
