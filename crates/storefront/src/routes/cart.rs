//! Cart route handlers.
//!
//! The cart lives in the session as a [`jewelbox_core::Cart`]. Adding a
//! product that is already in the cart replaces its line. Prices shown here
//! are snapshots; checkout re-reads them from the catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use jewelbox_core::{
    Cart, CartItem, Money, PackagingChoice, PackagingKind, PackagingSelection, ProductId,
};

use super::layout::Layout;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{PackagingOption, session_keys};
use crate::state::AppState;

/// Read the visitor's cart; a missing cart is empty.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> std::result::Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Persist the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(
    session: &Session,
    cart: &Cart,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Percent-encode a message for a redirect query string.
pub(crate) fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub items: Vec<CartItem>,
    pub total: Money,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<CartShowTemplate> {
    let cart = load_cart(&session).await?;
    let layout = Layout::load(&state, &session, user).await;
    Ok(CartShowTemplate {
        layout,
        total: cart.total(),
        items: cart.into_items(),
    })
}

/// Form data for adding to the cart.
///
/// Packaging fields carry option names; prices come from the catalog.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub box_color: String,
    #[serde(default)]
    pub inner_cloth: String,
    #[serde(default)]
    pub cushion: String,
    #[serde(default)]
    pub ribbon_color: String,
    #[serde(default)]
    pub gift_message: String,
}

const fn default_quantity() -> u32 {
    1
}

impl AddToCartForm {
    fn submitted(&self, kind: PackagingKind) -> &str {
        let value = match kind {
            PackagingKind::Box => &self.box_color,
            PackagingKind::Cloth => &self.inner_cloth,
            PackagingKind::Cushion => &self.cushion,
            PackagingKind::Ribbon => &self.ribbon_color,
        };
        value.trim()
    }

    /// Resolve submitted option names against the catalog.
    fn packaging(
        &self,
        options: &[PackagingOption],
    ) -> std::result::Result<PackagingSelection, String> {
        let mut selection = PackagingSelection {
            gift_message: Some(self.gift_message.trim().to_owned()).filter(|m| !m.is_empty()),
            ..PackagingSelection::default()
        };
        for kind in PackagingKind::ALL {
            let name = self.submitted(kind);
            if name.is_empty() {
                continue;
            }
            let option = options
                .iter()
                .find(|o| o.kind == kind && o.name == name)
                .ok_or_else(|| format!("Unknown {kind} option: {name}"))?;
            selection.set(
                kind,
                Some(PackagingChoice::new(option.name.clone(), option.price)),
            );
        }
        Ok(selection)
    }
}

/// Add a product to the cart, replacing any existing line for it.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .product(form.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    let back = |message: &str| {
        Redirect::to(&format!(
            "/products/{}?error={}",
            product.id,
            encode_query(message)
        ))
        .into_response()
    };

    let options = state.catalog().packaging_options().await?;
    let packaging = match form.packaging(&options) {
        Ok(packaging) => packaging,
        Err(message) => return Ok(back(&message)),
    };
    if !packaging.is_empty() && !product.packaging_eligible {
        return Ok(back("Custom packaging is not available for this product"));
    }

    let item = match CartItem::new(
        product.id,
        product.name.clone(),
        product.primary_image().map(str::to_owned),
        product.effective_price(),
        product.stock_count(),
        form.quantity,
    ) {
        Ok(item) => item.with_packaging(packaging),
        Err(e) => {
            warn!(product_id = %product.id, error = %e, "Rejected cart line");
            return Ok(back(&e.to_string()));
        }
    };

    let mut cart = load_cart(&session).await?;
    cart.add(item);
    save_cart(&session, &cart).await?;

    Ok(Redirect::to("/cart").into_response())
}

/// Form data for removing a line.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Remove a product from the cart. Unknown products are ignored.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(form.product_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect> {
    save_cart(&session, &Cart::new()).await?;
    Ok(Redirect::to("/cart"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use jewelbox_core::PackagingOptionId;

    use super::*;

    fn option(kind: PackagingKind, name: &str, price: &str) -> PackagingOption {
        PackagingOption {
            id: PackagingOptionId::new(1),
            kind,
            name: name.to_string(),
            price: Money::parse(price).unwrap(),
            color_code: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn form(box_color: &str, gift_message: &str) -> AddToCartForm {
        AddToCartForm {
            product_id: ProductId::new(1),
            quantity: 1,
            box_color: box_color.to_string(),
            inner_cloth: String::new(),
            cushion: String::new(),
            ribbon_color: String::new(),
            gift_message: gift_message.to_string(),
        }
    }

    #[test]
    fn test_packaging_uses_catalog_price() {
        let options = vec![option(PackagingKind::Box, "Red", "10")];
        let selection = form("Red", "  Happy birthday ").packaging(&options).unwrap();
        assert_eq!(selection.price(), Money::parse("10").unwrap());
        assert_eq!(selection.gift_message.as_deref(), Some("Happy birthday"));
    }

    #[test]
    fn test_packaging_rejects_unknown_option() {
        let options = vec![option(PackagingKind::Ribbon, "Red", "10")];
        let err = form("Red", "").packaging(&options).unwrap_err();
        assert_eq!(err, "Unknown box option: Red");
    }

    #[test]
    fn test_empty_form_means_no_packaging() {
        let selection = form(" ", "").packaging(&[]).unwrap();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_encode_query() {
        assert_eq!(encode_query("only 2 in stock"), "only+2+in+stock");
    }
}
