//! Checkout: turn cart lines into a persisted order.
//!
//! Everything happens in one transaction. Product rows are decremented in
//! ascending id order with a conditional `UPDATE`, so two checkouts for the
//! same product serialize on the row lock and neither can oversell. Prices
//! and packaging prices are read from the catalog, never from the client.
//! Any failure drops the transaction and nothing is written.

use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::{info, instrument};

use jewelbox_core::order::{AddressError, OrderTotals, PricingPolicy, ShippingAddress};
use jewelbox_core::{
    Cart, CartError, CartItem, PackagingChoice, PackagingKind, PackagingSelection, ProductId,
    UserId,
};

use crate::db::orders::insert_in_tx;
use crate::db::packaging::find_in_tx;
use crate::db::{NewOrder, NewOrderItem, OrderRepository, RepositoryError};
use crate::models::{Order, Product};

/// One requested line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    #[serde(alias = "product")]
    pub product_id: ProductId,
    #[serde(alias = "qty")]
    pub quantity: u32,
    #[serde(default)]
    pub packaging: Option<PackagingSelection>,
}

impl From<&CartItem> for CheckoutLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            packaging: item.packaging.clone(),
        }
    }
}

/// Errors raised while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("No order items")]
    EmptyCart,

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Product {0} not found")]
    ProductNotFound(ProductId),

    #[error("Not enough stock for {name}: {available} left, {requested} requested")]
    InsufficientStock {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("Unknown {kind} option: {name}")]
    UnknownPackaging { kind: PackagingKind, name: String },

    #[error("Custom packaging is not available for {0}")]
    PackagingUnavailable(String),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Places orders.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    pricing: PricingPolicy,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, pricing: PricingPolicy) -> Self {
        Self { pool, pricing }
    }

    /// Validate, reprice and persist an order, decrementing stock.
    ///
    /// Repeated product ids collapse to the last occurrence, matching how
    /// the cart treats a second add.
    ///
    /// # Errors
    ///
    /// Returns a validation variant of `CheckoutError` for bad input or short
    /// stock and `CheckoutError::Repository` for database failures.
    #[instrument(skip(self, lines, shipping_address), fields(user_id = %user_id, lines = lines.len()))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        lines: Vec<CheckoutLine>,
        shipping_address: ShippingAddress,
        payment_method: String,
    ) -> Result<Order, CheckoutError> {
        let shipping_address = shipping_address.validate()?;
        let lines = dedupe_lines(lines);
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if lines.iter().any(|line| line.quantity == 0) {
            return Err(CartError::ZeroQuantity.into());
        }

        let mut tx = self.pool.begin().await?;

        let mut lock_order: Vec<&CheckoutLine> = lines.iter().collect();
        lock_order.sort_by_key(|line| line.product_id);

        let mut reserved = Vec::with_capacity(lines.len());
        for line in lock_order {
            let product = reserve_stock(&mut tx, line).await?;
            reserved.push(product);
        }

        let mut cart = Cart::new();
        for line in &lines {
            let Some(product) = reserved.iter().find(|p| p.id == line.product_id) else {
                return Err(CheckoutError::ProductNotFound(line.product_id));
            };
            let packaging = match &line.packaging {
                Some(selection) if !selection.is_empty() => {
                    if !product.packaging_eligible {
                        return Err(CheckoutError::PackagingUnavailable(product.name.clone()));
                    }
                    Some(reprice_packaging(&mut tx, selection).await?)
                }
                _ => None,
            };

            // Stock was already decremented, so the snapshot is the pre-checkout value.
            let stock_before = product.stock_count().saturating_add(line.quantity);
            let mut item = CartItem::new(
                product.id,
                product.name.clone(),
                product.primary_image().map(str::to_owned),
                product.effective_price(),
                stock_before,
                line.quantity,
            )?;
            if let Some(packaging) = packaging {
                item = item.with_packaging(packaging);
            }
            cart.add(item);
        }

        let totals = OrderTotals::compute(&cart, &self.pricing);
        let order = NewOrder {
            user_id,
            shipping_address,
            payment_method,
            totals,
            items: cart
                .items()
                .iter()
                .map(new_order_item)
                .collect::<Result<_, _>>()?,
        };

        let order_id = insert_in_tx(&mut tx, &order).await?;
        tx.commit().await?;

        info!(order_id = %order_id, total = %totals.total_price, "Order placed");

        OrderRepository::new(self.pool)
            .get(order_id)
            .await?
            .ok_or(CheckoutError::Repository(RepositoryError::NotFound))
    }
}

/// Keep one line per product: the last occurrence, in first-seen position.
fn dedupe_lines(lines: Vec<CheckoutLine>) -> Vec<CheckoutLine> {
    let mut deduped: Vec<CheckoutLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match deduped.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => *existing = line,
            None => deduped.push(line),
        }
    }
    deduped
}

/// Decrement stock for one line, returning the updated product row.
async fn reserve_stock(
    tx: &mut Transaction<'_, Postgres>,
    line: &CheckoutLine,
) -> Result<Product, CheckoutError> {
    let quantity = i32::try_from(line.quantity).unwrap_or(i32::MAX);

    let updated = sqlx::query_as::<_, Product>(
        r"
        UPDATE shop.product
        SET stock = stock - $2
        WHERE id = $1 AND stock >= $2
        RETURNING id, name, description, price, discount_price, stock, images,
                  category, featured, packaging_eligible, created_at, updated_at
        ",
    )
    .bind(line.product_id)
    .bind(quantity)
    .fetch_optional(&mut **tx)
    .await?;

    if let Some(product) = updated {
        return Ok(product);
    }

    let current: Option<(String, i32)> =
        sqlx::query_as("SELECT name, stock FROM shop.product WHERE id = $1")
            .bind(line.product_id)
            .fetch_optional(&mut **tx)
            .await?;

    match current {
        Some((name, stock)) => Err(CheckoutError::InsufficientStock {
            name,
            requested: line.quantity,
            available: u32::try_from(stock).unwrap_or(0),
        }),
        None => Err(CheckoutError::ProductNotFound(line.product_id)),
    }
}

/// Replace client-sent packaging prices with catalog prices.
async fn reprice_packaging(
    tx: &mut Transaction<'_, Postgres>,
    selection: &PackagingSelection,
) -> Result<PackagingSelection, CheckoutError> {
    let mut repriced = PackagingSelection {
        gift_message: selection
            .gift_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned),
        ..PackagingSelection::default()
    };

    for kind in PackagingKind::ALL {
        let Some(choice) = selection.choice(kind) else {
            continue;
        };
        let option = find_in_tx(tx, kind, &choice.name).await?.ok_or_else(|| {
            CheckoutError::UnknownPackaging {
                kind,
                name: choice.name.clone(),
            }
        })?;
        repriced.set(kind, Some(PackagingChoice::new(option.name, option.price)));
    }

    Ok(repriced)
}

fn new_order_item(item: &CartItem) -> Result<NewOrderItem, CheckoutError> {
    let quantity = i32::try_from(item.quantity).map_err(|_| CheckoutError::InsufficientStock {
        name: item.name.clone(),
        requested: item.quantity,
        available: item.stock,
    })?;

    Ok(NewOrderItem {
        product_id: item.product_id,
        name: item.name.clone(),
        image: item.image.clone(),
        unit_price: item.unit_price,
        quantity,
        packaging: item.packaging.clone(),
        packaging_price: item.packaging_price(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, quantity: u32) -> CheckoutLine {
        CheckoutLine {
            product_id: ProductId::new(id),
            quantity,
            packaging: None,
        }
    }

    #[test]
    fn test_dedupe_keeps_last_quantity_in_first_position() {
        let lines = dedupe_lines(vec![line(3, 1), line(1, 2), line(3, 5)]);
        assert_eq!(lines, vec![line(3, 5), line(1, 2)]);
    }

    #[test]
    fn test_line_accepts_client_field_names() {
        let parsed: CheckoutLine = serde_json::from_str(
            r#"{"product": 7, "qty": 2, "packaging": {"boxColor": {"name": "Red", "price": "10"}}}"#,
        )
        .unwrap();
        assert_eq!(parsed.product_id, ProductId::new(7));
        assert_eq!(parsed.quantity, 2);
        assert!(parsed.packaging.unwrap().box_color.is_some());
    }

    #[test]
    fn test_new_order_item_copies_packaging_price() {
        let item = CartItem::new(
            ProductId::new(1),
            "Ring",
            None,
            jewelbox_core::Money::parse("100").unwrap(),
            5,
            2,
        )
        .unwrap()
        .with_packaging(PackagingSelection {
            box_color: Some(PackagingChoice::new(
                "Red",
                jewelbox_core::Money::parse("10").unwrap(),
            )),
            ..PackagingSelection::default()
        });

        let order_item = new_order_item(&item).unwrap();
        assert_eq!(order_item.quantity, 2);
        assert_eq!(
            order_item.packaging_price,
            jewelbox_core::Money::parse("10").unwrap()
        );
    }

    #[test]
    fn test_error_messages() {
        let err = CheckoutError::InsufficientStock {
            name: "Ring".to_string(),
            requested: 3,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "Not enough stock for Ring: 1 left, 3 requested"
        );
        assert_eq!(CheckoutError::EmptyCart.to_string(), "No order items");
    }
}
