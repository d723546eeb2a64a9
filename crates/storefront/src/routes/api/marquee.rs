//! Marquee banner API handlers.

use axum::{Json, extract::State};
use tracing::{info, instrument};

use jewelbox_core::marquee::MarqueePatch;

use super::ApiJson;
use crate::db::MarqueeRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::Marquee;
use crate::state::AppState;

/// `GET /api/marquee`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<Marquee>> {
    Ok(Json(state.catalog().marquee().await?))
}

/// `PUT /api/marquee`
///
/// Only the fields present in the body change.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(patch): ApiJson<MarqueePatch>,
) -> Result<Json<Marquee>> {
    let repo = MarqueeRepository::new(state.pool());
    let settings = repo.get_or_create().await?.settings().apply(patch);
    let marquee = repo.save(&settings).await?;

    state.catalog().invalidate_all().await;
    info!(is_active = marquee.is_active, "Marquee updated");
    Ok(Json(marquee))
}
