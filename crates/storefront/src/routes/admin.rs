//! Admin dashboard.
//!
//! One page listing every catalog entity and all orders. The forms on it
//! talk to the REST API (`static/js/admin.js` and htmx); this handler only
//! renders.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use jewelbox_core::{HeroVariant, Money, PackagingKind};

use super::layout::Layout;
use crate::db::{OrderRepository, ProductFilter, ProductRepository, UserRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Category, HeroSlide, Marquee, Order, PackagingOption, Product};
use crate::state::AppState;

/// Headline numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub orders: i64,
    pub revenue: Money,
    pub products: i64,
    pub users: i64,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub stats: DashboardStats,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub slides: Vec<HeroSlide>,
    pub packaging: Vec<PackagingOption>,
    pub marquee: Marquee,
    pub orders: Vec<Order>,
    pub packaging_kinds: [PackagingKind; 4],
    pub hero_variants: [HeroVariant; 2],
}

/// Display the dashboard.
///
/// Reads go straight to the repositories for orders and counts, and through
/// the catalog cache for everything else (mutations invalidate it).
#[instrument(skip(state, session, admin), fields(admin_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<DashboardTemplate> {
    let pool = state.pool();
    let catalog = state.catalog();

    let orders_repo = OrderRepository::new(pool);
    let (order_count, revenue) = orders_repo.summary().await?;
    let stats = DashboardStats {
        orders: order_count,
        revenue,
        products: ProductRepository::new(pool).count().await?,
        users: UserRepository::new(pool).count().await?,
    };

    Ok(DashboardTemplate {
        layout: Layout::load(&state, &session, Some(admin)).await,
        stats,
        products: catalog.products(&ProductFilter::default()).await?,
        categories: catalog.categories().await?,
        slides: catalog.hero_slides(false).await?,
        packaging: catalog.packaging_options().await?,
        marquee: catalog.marquee().await?,
        orders: orders_repo.list_all().await?,
        packaging_kinds: PackagingKind::ALL,
        hero_variants: [HeroVariant::Product, HeroVariant::ComingSoon],
    })
}
