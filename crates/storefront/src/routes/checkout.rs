//! Checkout route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use jewelbox_core::order::{DEFAULT_PAYMENT_METHOD, OrderTotals, ShippingAddress};
use jewelbox_core::{Cart, CartItem};

use super::cart::{load_cart, save_cart};
use super::layout::Layout;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::services::{CheckoutError, CheckoutLine, CheckoutService};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub items: Vec<CartItem>,
    pub totals: OrderTotals,
    pub address: ShippingAddress,
    pub error: Option<String>,
}

async fn render(
    state: &AppState,
    session: &Session,
    user: CurrentUser,
    cart: Cart,
    address: ShippingAddress,
    error: Option<String>,
) -> CheckoutTemplate {
    let totals = OrderTotals::compute(&cart, &state.config().pricing);
    CheckoutTemplate {
        layout: Layout::load(state, session, Some(user)).await,
        items: cart.into_items(),
        totals,
        address,
        error,
    }
}

/// Display the address form and order summary.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }
    Ok(render(&state, &session, user, cart, ShippingAddress::default(), None)
        .await
        .into_response())
}

/// Address form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// Place the order for the session cart.
///
/// Validation and stock failures re-render the form; the cart is kept so
/// the visitor can adjust it.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = load_cart(&session).await?;
    let address = ShippingAddress {
        address: form.address,
        city: form.city,
        postal_code: form.postal_code,
        country: form.country,
    };
    let lines: Vec<CheckoutLine> = cart.items().iter().map(CheckoutLine::from).collect();

    let result = CheckoutService::new(state.pool(), state.config().pricing)
        .place_order(
            user.id,
            lines,
            address.clone(),
            DEFAULT_PAYMENT_METHOD.to_string(),
        )
        .await;

    match result {
        Ok(order) => {
            save_cart(&session, &Cart::new()).await?;
            state.catalog().invalidate_all().await;
            info!(order_id = %order.id, "Checkout completed");
            Ok(Redirect::to(&format!("/account?placed={}", order.id)).into_response())
        }
        Err(CheckoutError::Repository(e)) => Err(CheckoutError::Repository(e).into()),
        Err(e) => {
            let page = render(&state, &session, user, cart, address, Some(e.to_string())).await;
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
    }
}
