//! Account route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::layout::Layout;
use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Order;
use crate::state::AppState;

/// Query parameters for the account page.
#[derive(Debug, Default, Deserialize)]
pub struct AccountQuery {
    /// Set after checkout to the new order's id.
    pub placed: Option<i32>,
}

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub layout: Layout,
    pub orders: Vec<Order>,
    pub placed: Option<i32>,
}

/// Display the signed-in user's orders, newest first.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(query): Query<AccountQuery>,
) -> Result<AccountIndexTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(AccountIndexTemplate {
        layout: Layout::load(&state, &session, Some(user)).await,
        orders,
        placed: query.placed,
    })
}
