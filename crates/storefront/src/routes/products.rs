//! Shop listing and product detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use jewelbox_core::{PackagingKind, ProductId};

use super::layout::Layout;
use crate::db::ProductFilter;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Category, PackagingOption, Product};
use crate::state::AppState;

/// Shop query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ShopQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
}

/// Shop listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ShopTemplate {
    pub layout: Layout,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub keyword: String,
    pub category: String,
}

/// Packaging options of one kind, for a `<select>` on the product page.
#[derive(Debug, Clone)]
pub struct PackagingGroup {
    pub field: &'static str,
    pub label: &'static str,
    pub options: Vec<PackagingOption>,
}

/// Form field name for each packaging slot.
pub const fn packaging_field(kind: PackagingKind) -> &'static str {
    match kind {
        PackagingKind::Box => "box_color",
        PackagingKind::Cloth => "inner_cloth",
        PackagingKind::Cushion => "cushion",
        PackagingKind::Ribbon => "ribbon_color",
    }
}

fn group_packaging(options: &[PackagingOption]) -> Vec<PackagingGroup> {
    PackagingKind::ALL
        .into_iter()
        .map(|kind| PackagingGroup {
            field: packaging_field(kind),
            label: kind.label(),
            options: options.iter().filter(|o| o.kind == kind).cloned().collect(),
        })
        .filter(|group| !group.options.is_empty())
        .collect()
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub product: Product,
    pub packaging: Vec<PackagingGroup>,
    pub error: Option<String>,
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub layout: Layout,
}

/// Display the shop, filtered by keyword and category.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ShopQuery>,
) -> Result<ShopTemplate> {
    let filter = ProductFilter::from_query(query.keyword.as_deref(), query.category.as_deref());
    let products = state.catalog().products(&filter).await?;
    let categories = state.catalog().categories().await?;

    Ok(ShopTemplate {
        layout: Layout::load(&state, &session, user).await,
        products,
        categories,
        keyword: filter.keyword.unwrap_or_default(),
        category: filter.category.unwrap_or_default(),
    })
}

/// Query parameters for the product page.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub error: Option<String>,
}

/// Display a product with its add-to-cart form.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Query(query): Query<ProductQuery>,
) -> Result<Response> {
    let layout = Layout::load(&state, &session, user).await;
    let Some(product) = state.catalog().product(id).await? else {
        return Ok((StatusCode::NOT_FOUND, NotFoundTemplate { layout }).into_response());
    };

    let packaging = if product.packaging_eligible {
        group_packaging(&state.catalog().packaging_options().await?)
    } else {
        Vec::new()
    };

    Ok(ProductShowTemplate {
        layout,
        product,
        packaging,
        error: query.error,
    }
    .into_response())
}

/// Fallback for unknown pages.
pub async fn not_found(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let layout = Layout::load(&state, &session, user).await;
    (StatusCode::NOT_FOUND, NotFoundTemplate { layout })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use jewelbox_core::{Money, PackagingOptionId};

    use super::*;

    fn option(id: i32, kind: PackagingKind, name: &str) -> PackagingOption {
        PackagingOption {
            id: PackagingOptionId::new(id),
            kind,
            name: name.to_string(),
            price: Money::ZERO,
            color_code: None,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_group_packaging_skips_empty_kinds() {
        let groups = group_packaging(&[
            option(1, PackagingKind::Ribbon, "Gold"),
            option(2, PackagingKind::Box, "Red"),
            option(3, PackagingKind::Box, "Blue"),
        ]);
        let fields: Vec<_> = groups.iter().map(|g| g.field).collect();
        assert_eq!(fields, vec!["box_color", "ribbon_color"]);
        assert_eq!(groups.first().unwrap().options.len(), 2);
    }
}
