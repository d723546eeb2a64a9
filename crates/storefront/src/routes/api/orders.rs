//! Order API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{info, instrument};

use jewelbox_core::OrderId;
use jewelbox_core::order::{DEFAULT_PAYMENT_METHOD, ShippingAddress};

use super::{ApiJson, not_found_as};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::Order;
use crate::services::{CheckoutLine, CheckoutService};
use crate::state::AppState;

/// Checkout request body. Client-computed prices are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(alias = "items")]
    pub order_items: Vec<CheckoutLine>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// `POST /api/orders`
#[instrument(skip(state, user, request), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let payment_method = request
        .payment_method
        .map(|m| m.trim().to_owned())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

    let order = CheckoutService::new(state.pool(), state.config().pricing)
        .place_order(
            user.id,
            request.order_items,
            request.shipping_address,
            payment_method,
        )
        .await?;

    // Stock changed.
    state.catalog().invalidate_all().await;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/myorders`
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(
        OrderRepository::new(state.pool())
            .list_for_user(user.id)
            .await?,
    ))
}

/// `GET /api/orders`
#[instrument(skip(state, _admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(state.pool()).list_all().await?))
}

/// `GET /api/orders/{id}`; the owner or an admin.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if !order.is_owned_by(user.id) && !user.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view this order".to_string(),
        ));
    }
    Ok(Json(order))
}

/// `PUT /api/orders/{id}/deliver`
///
/// Repeating the call keeps the first delivery timestamp.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn deliver(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .mark_delivered(id)
        .await
        .map_err(|e| not_found_as(e, "Order not found"))?;

    info!(order_id = %id, delivered_at = ?order.delivered_at, "Order marked delivered");
    Ok(Json(order))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_client_body() {
        let body = r#"{
            "orderItems": [{"product": 3, "qty": 2}],
            "shippingAddress": {"address": "1 Main St", "city": "Pune", "postalCode": "411001", "country": "India"},
            "paymentMethod": "Razorpay",
            "itemsPrice": 999,
            "totalPrice": 999
        }"#;
        let request: PlaceOrderRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.order_items.len(), 1);
        assert_eq!(request.order_items.first().unwrap().quantity, 2);
        assert_eq!(request.shipping_address.postal_code, "411001");
    }
}
