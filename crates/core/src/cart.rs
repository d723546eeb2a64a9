//! Cart aggregator.
//!
//! A cart is an ordered list of lines keyed by product. Adding a product that
//! is already present replaces its line in place (quantity and packaging come
//! from the newer add), so there is never more than one line per product.
//!
//! Lines carry a snapshot of the product taken when they were added. Live
//! stock is not consulted again until checkout.

use serde::{Deserialize, Serialize};

use crate::packaging::PackagingSelection;
use crate::types::{Money, ProductId};

/// Errors raised when building a cart line.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("only {available} in stock, {requested} requested")]
    InsufficientStock { requested: u32, available: u32 },
}

/// One product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Unit price at add time.
    pub unit_price: Money,
    /// Stock at add time; bounds `quantity`.
    pub stock: u32,
    pub quantity: u32,
    #[serde(default)]
    pub packaging: Option<PackagingSelection>,
}

impl CartItem {
    /// Build a line, enforcing `1 <= quantity <= stock`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] for a zero quantity and
    /// [`CartError::InsufficientStock`] when `quantity` exceeds `stock`.
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        image: Option<String>,
        unit_price: Money,
        stock: u32,
        quantity: u32,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if quantity > stock {
            return Err(CartError::InsufficientStock {
                requested: quantity,
                available: stock,
            });
        }
        Ok(Self {
            product_id,
            name: name.into(),
            image,
            unit_price,
            stock,
            quantity,
            packaging: None,
        })
    }

    /// Attach a packaging selection. An empty selection is dropped.
    #[must_use]
    pub fn with_packaging(mut self, packaging: PackagingSelection) -> Self {
        self.packaging = (!packaging.is_empty()).then_some(packaging);
        self
    }

    /// Packaging price per unit.
    #[must_use]
    pub fn packaging_price(&self) -> Money {
        self.packaging
            .as_ref()
            .map_or(Money::ZERO, PackagingSelection::price)
    }

    /// `(unit price + packaging price) * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        (self.unit_price + self.packaging_price()) * self.quantity
    }
}

/// A visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert a line, replacing any existing line for the same product in
    /// its original position.
    pub fn add(&mut self, item: CartItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            *existing = item;
        } else {
            self.items.push(item);
        }
    }

    /// Remove the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of every line total.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|line| line.product_id == product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the cart, yielding its lines in order.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<T: IntoIterator<Item = CartItem>>(iter: T) -> Self {
        let mut cart = Self::new();
        for item in iter {
            cart.add(item);
        }
        cart
    }
}
