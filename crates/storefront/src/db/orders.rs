//! Order repository.
//!
//! Orders are written once at checkout (inside the checkout transaction) and
//! afterwards only the delivery flag changes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use jewelbox_core::order::{OrderTotals, ShippingAddress};
use jewelbox_core::{Email, Money, OrderId, PackagingSelection, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderCustomer, OrderItem};

/// An order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub totals: OrderTotals,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: Money,
    pub quantity: i32,
    pub packaging: Option<PackagingSelection>,
    pub packaging_price: Money,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    user_name: String,
    user_email: Email,
    address: String,
    city: String,
    postal_code: String,
    country: String,
    payment_method: String,
    items_price: Money,
    tax_price: Money,
    shipping_price: Money,
    total_price: Money,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: OrderId,
    product_id: Option<ProductId>,
    name: String,
    image: Option<String>,
    unit_price: Money,
    quantity: i32,
    packaging: Option<Json<PackagingSelection>>,
    packaging_price: Money,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user: OrderCustomer {
                id: self.user_id,
                name: self.user_name,
                email: self.user_email,
            },
            items,
            shipping_address: ShippingAddress {
                address: self.address,
                city: self.city,
                postal_code: self.postal_code,
                country: self.country,
            },
            payment_method: self.payment_method,
            items_price: self.items_price,
            tax_price: self.tax_price,
            shipping_price: self.shipping_price,
            total_price: self.total_price,
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        }
    }
}

impl From<ItemRow> for OrderItem {
    fn from(row: ItemRow) -> Self {
        Self {
            product_id: row.product_id,
            name: row.name,
            image: row.image,
            unit_price: row.unit_price,
            quantity: row.quantity,
            packaging: row.packaging.map(|Json(p)| p),
            packaging_price: row.packaging_price,
        }
    }
}

const ORDER_SELECT: &str = r"
    SELECT o.id, o.user_id, a.name AS user_name, a.email AS user_email,
           o.address, o.city, o.postal_code, o.country, o.payment_method,
           o.items_price, o.tax_price, o.shipping_price, o.total_price,
           o.is_paid, o.paid_at, o.is_delivered, o.delivered_at, o.created_at
    FROM shop.customer_order o
    JOIN shop.account a ON a.id = o.user_id
";

/// Insert an order and its lines inside an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if an insert fails.
pub async fn insert_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    order: &NewOrder,
) -> Result<OrderId, RepositoryError> {
    let order_id: OrderId = sqlx::query_scalar(
        r"
        INSERT INTO shop.customer_order
            (user_id, address, city, postal_code, country, payment_method,
             items_price, tax_price, shipping_price, total_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        ",
    )
    .bind(order.user_id)
    .bind(&order.shipping_address.address)
    .bind(&order.shipping_address.city)
    .bind(&order.shipping_address.postal_code)
    .bind(&order.shipping_address.country)
    .bind(&order.payment_method)
    .bind(order.totals.items_price)
    .bind(order.totals.tax_price)
    .bind(order.totals.shipping_price)
    .bind(order.totals.total_price)
    .fetch_one(&mut **tx)
    .await?;

    for (position, item) in (0_i32..).zip(&order.items) {
        sqlx::query(
            r"
            INSERT INTO shop.order_item
                (order_id, position, product_id, name, image, unit_price,
                 quantity, packaging, packaging_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(order_id)
        .bind(position)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.image.as_deref())
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(item.packaging.as_ref().map(Json))
        .bind(item.packaging_price)
        .execute(&mut **tx)
        .await?;
    }

    Ok(order_id)
}

/// Repository for order reads and delivery updates.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC, o.id DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Every order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT} ORDER BY o.created_at DESC, o.id DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Mark an order delivered. Calling it again keeps the first timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let updated: Option<OrderId> = sqlx::query_scalar(
            r"
            UPDATE shop.customer_order
            SET is_delivered = TRUE,
                delivered_at = COALESCE(delivered_at, NOW())
            WHERE id = $1
            RETURNING id
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let id = updated.ok_or(RepositoryError::NotFound)?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Order count and summed order totals.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self) -> Result<(i64, Money), RepositoryError> {
        let (count, revenue): (i64, Money) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_price), 0) FROM shop.customer_order",
        )
        .fetch_one(self.pool)
        .await?;
        Ok((count, revenue))
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
        let item_rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT order_id, product_id, name, image, unit_price, quantity,
                   packaging, packaging_price
            FROM shop.order_item
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in item_rows {
            items_by_order
                .entry(row.order_id)
                .or_default()
                .push(OrderItem::from(row));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }
}
