//! Packaging option API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::{info, instrument};

use jewelbox_core::PackagingOptionId;

use super::{ApiJson, not_found_as};
use crate::db::PackagingRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{PackagingOption, PackagingOptionInput};
use crate::state::AppState;

fn validate(mut input: PackagingOptionInput) -> Result<PackagingOptionInput> {
    input.name = input.name.trim().to_owned();
    if input.name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    input.color_code = input.color_code.filter(|c| !c.trim().is_empty());
    input.image_url = input.image_url.filter(|u| !u.trim().is_empty());
    Ok(input)
}

/// `GET /api/packaging`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<PackagingOption>>> {
    Ok(Json(state.catalog().packaging_options().await?))
}

/// `POST /api/packaging`
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(input): ApiJson<PackagingOptionInput>,
) -> Result<(StatusCode, Json<PackagingOption>)> {
    let input = validate(input)?;
    let option = PackagingRepository::new(state.pool()).create(&input).await?;

    state.catalog().invalidate_all().await;
    info!(option_id = %option.id, kind = %option.kind, "Packaging option created");
    Ok((StatusCode::CREATED, Json(option)))
}

/// `PUT /api/packaging/{id}`
#[instrument(skip(state, admin, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<PackagingOptionId>,
    ApiJson(input): ApiJson<PackagingOptionInput>,
) -> Result<Json<PackagingOption>> {
    let input = validate(input)?;
    let option = PackagingRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(|e| not_found_as(e, "Packaging option not found"))?;

    state.catalog().invalidate_all().await;
    info!(option_id = %option.id, "Packaging option updated");
    Ok(Json(option))
}

/// `DELETE /api/packaging/{id}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<PackagingOptionId>,
) -> Result<Json<Value>> {
    PackagingRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| not_found_as(e, "Packaging option not found"))?;

    state.catalog().invalidate_all().await;
    info!(option_id = %id, "Packaging option deleted");
    Ok(Json(json!({ "message": "Packaging option removed" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_and_drops_blank_extras() {
        let input: PackagingOptionInput = serde_json::from_str(
            r#"{"type": "ribbon", "name": " Gold ", "price": "5", "colorCode": " "}"#,
        )
        .unwrap();
        let input = validate(input).unwrap();
        assert_eq!(input.name, "Gold");
        assert_eq!(input.color_code, None);
    }

    #[test]
    fn test_price_must_be_whole_cents() {
        let body = r#"{"type": "box", "name": "Red", "price": "1.239"}"#;
        assert!(serde_json::from_str::<PackagingOptionInput>(body).is_err());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let input: PackagingOptionInput =
            serde_json::from_str(r#"{"type": "box", "name": "  "}"#).unwrap();
        assert!(validate(input).is_err());
    }
}
