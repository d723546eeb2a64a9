//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::db::ProductFilter;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Category, HeroSlide, Product};
use crate::state::AppState;

/// Products shown in the home page grid.
const HOME_PRODUCT_LIMIT: i64 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub slides: Vec<HeroSlide>,
    pub featured: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Display the home page.
///
/// Shows featured products, falling back to the newest ones when nothing is
/// featured.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    let catalog = state.catalog();
    let slides = catalog.hero_slides(true).await?;
    let categories = catalog.categories().await?;

    let mut featured = catalog
        .products(&ProductFilter {
            featured_only: true,
            limit: Some(HOME_PRODUCT_LIMIT),
            ..ProductFilter::default()
        })
        .await?;
    if featured.is_empty() {
        featured = catalog
            .products(&ProductFilter {
                limit: Some(HOME_PRODUCT_LIMIT),
                ..ProductFilter::default()
            })
            .await?;
    }

    Ok(HomeTemplate {
        layout: Layout::load(&state, &session, user).await,
        slides,
        featured,
        categories,
    })
}
