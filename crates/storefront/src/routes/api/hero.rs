//! Hero slide API handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::{info, instrument};

use jewelbox_core::hero::{linked_product, parse_product_ref};
use jewelbox_core::{HeroSlideId, HeroVariant, ProductId};

use super::form::MultipartForm;
use super::{not_found_as, store_image};
use crate::db::HeroRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{HeroSlide, HeroSlideInput};
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

fn product_ref(form: &MultipartForm) -> Result<Option<ProductId>> {
    parse_product_ref(form.raw("productId")).map_err(|e| AppError::BadRequest(e.to_string()))
}

fn variant(form: &MultipartForm) -> Result<Option<HeroVariant>> {
    form.parsed::<HeroVariant>("type")
}

fn new_slide(form: &MultipartForm) -> Result<HeroSlideInput> {
    let variant = variant(form)?.unwrap_or_default();
    Ok(HeroSlideInput {
        image: String::new(),
        heading: form.required("heading")?,
        sub_heading: form.required("subHeading")?,
        description: form.text("description").unwrap_or_default(),
        product_code: form.required("productCode")?,
        is_active: form.flag("isActive").unwrap_or(true),
        variant,
        product_id: linked_product(variant, product_ref(form)?),
    })
}

/// Overlay submitted fields on an existing slide. Switching to coming-soon
/// without naming a product clears the link.
fn merge_slide(current: &HeroSlide, form: &MultipartForm) -> Result<HeroSlideInput> {
    let mut input = HeroSlideInput::from(current);
    if let Some(heading) = form.text("heading") {
        input.heading = heading;
    }
    if let Some(sub_heading) = form.text("subHeading") {
        input.sub_heading = sub_heading;
    }
    if let Some(description) = form.text("description") {
        input.description = description;
    }
    if let Some(product_code) = form.text("productCode") {
        input.product_code = product_code;
    }
    if let Some(is_active) = form.flag("isActive") {
        input.is_active = is_active;
    }

    let submitted_variant = variant(form)?;
    if let Some(variant) = submitted_variant {
        input.variant = variant;
    }
    match product_ref(form)? {
        Some(product_id) => input.product_id = Some(product_id),
        None if submitted_variant == Some(HeroVariant::ComingSoon) => input.product_id = None,
        None => {}
    }
    input.product_id = linked_product(input.variant, input.product_id);

    Ok(input)
}

/// `GET /api/hero`
#[instrument(skip(state))]
pub async fn active(State(state): State<AppState>) -> Result<Json<Vec<HeroSlide>>> {
    Ok(Json(state.catalog().hero_slides(true).await?))
}

/// `GET /api/hero/all`
#[instrument(skip(state, _admin))]
pub async fn all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<HeroSlide>>> {
    Ok(Json(state.catalog().hero_slides(false).await?))
}

/// `POST /api/hero`
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<HeroSlide>)> {
    let form = MultipartForm::parse(multipart, 1).await?;
    let mut input = new_slide(&form)?;
    input.image = store_image(&state, "hero", form.file(IMAGE_FIELD))
        .await?
        .ok_or_else(|| AppError::BadRequest("image is required".to_string()))?;

    let slide = match HeroRepository::new(state.pool()).create(&input).await {
        Ok(slide) => slide,
        Err(e) => {
            state.images().delete_quietly([input.image.as_str()]).await;
            return Err(e.into());
        }
    };

    state.catalog().invalidate_all().await;
    info!(slide_id = %slide.id, variant = %slide.variant, "Hero slide created");
    Ok((StatusCode::CREATED, Json(slide)))
}

/// `PUT /api/hero/{id}`
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<HeroSlideId>,
    multipart: Multipart,
) -> Result<Json<HeroSlide>> {
    let form = MultipartForm::parse(multipart, 1).await?;
    let repo = HeroRepository::new(state.pool());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Slide not found".to_string()))?;

    let mut input = merge_slide(&current, &form)?;
    let uploaded = store_image(&state, "hero", form.file(IMAGE_FIELD)).await?;
    if let Some(image) = &uploaded {
        input.image.clone_from(image);
    }

    let slide = match repo.update(id, &input).await {
        Ok(slide) => slide,
        Err(e) => {
            state.images().delete_quietly(uploaded.as_deref()).await;
            return Err(not_found_as(e, "Slide not found"));
        }
    };

    if uploaded.is_some() {
        state.images().delete_quietly([current.image.as_str()]).await;
    }

    state.catalog().invalidate_all().await;
    info!(slide_id = %slide.id, "Hero slide updated");
    Ok(Json(slide))
}

/// `DELETE /api/hero/{id}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<HeroSlideId>,
) -> Result<Json<Value>> {
    let repo = HeroRepository::new(state.pool());
    let slide = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Slide not found".to_string()))?;

    repo.delete(id)
        .await
        .map_err(|e| not_found_as(e, "Slide not found"))?;

    state.images().delete_quietly([slide.image.as_str()]).await;
    state.catalog().invalidate_all().await;

    info!(slide_id = %id, "Hero slide deleted");
    Ok(Json(json!({ "message": "Slide deleted" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn slide(variant: HeroVariant, product_id: Option<ProductId>) -> HeroSlide {
        HeroSlide {
            id: HeroSlideId::new(1),
            image: "/uploads/hero-1.png".to_string(),
            heading: "Spring".to_string(),
            sub_heading: "New rings".to_string(),
            description: String::new(),
            product_code: "SP-1".to_string(),
            is_active: true,
            variant,
            product_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_slide_ignores_product_for_coming_soon() {
        let form = MultipartForm::from_fields([
            ("heading", "Soon"),
            ("subHeading", "Autumn"),
            ("productCode", "AU-1"),
            ("type", "coming_soon"),
            ("productId", "5"),
        ]);
        let input = new_slide(&form).unwrap();
        assert_eq!(input.variant, HeroVariant::ComingSoon);
        assert_eq!(input.product_id, None);
    }

    #[test]
    fn test_new_slide_placeholder_product_means_none() {
        let form = MultipartForm::from_fields([
            ("heading", "Rings"),
            ("subHeading", "Gold"),
            ("productCode", "R-1"),
            ("productId", "undefined"),
        ]);
        let input = new_slide(&form).unwrap();
        assert_eq!(input.variant, HeroVariant::Product);
        assert_eq!(input.product_id, None);
        assert!(input.is_active);
    }

    #[test]
    fn test_switch_to_coming_soon_clears_product() {
        let current = slide(HeroVariant::Product, Some(ProductId::new(3)));
        let form = MultipartForm::from_fields([("type", "coming_soon")]);
        let input = merge_slide(&current, &form).unwrap();
        assert_eq!(input.variant, HeroVariant::ComingSoon);
        assert_eq!(input.product_id, None);
    }

    #[test]
    fn test_merge_keeps_product_when_not_submitted() {
        let current = slide(HeroVariant::Product, Some(ProductId::new(3)));
        let form = MultipartForm::from_fields([("heading", "Summer")]);
        let input = merge_slide(&current, &form).unwrap();
        assert_eq!(input.heading, "Summer");
        assert_eq!(input.product_id, Some(ProductId::new(3)));
    }

    #[test]
    fn test_bad_variant_rejected() {
        let current = slide(HeroVariant::Product, None);
        let form = MultipartForm::from_fields([("type", "banner")]);
        assert!(merge_slide(&current, &form).is_err());
    }
}
