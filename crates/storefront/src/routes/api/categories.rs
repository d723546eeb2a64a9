//! Category API handlers.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::{info, instrument};

use jewelbox_core::CategoryId;

use super::form::MultipartForm;
use super::{not_found_as, store_image};
use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryInput};
use crate::state::AppState;

const IMAGE_FIELD: &str = "image";

/// `GET /api/categories`
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().categories().await?))
}

/// `POST /api/categories`
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Category>)> {
    let form = MultipartForm::parse(multipart, 1).await?;
    let mut input = CategoryInput {
        name: form.required("name")?,
        description: form.text("description"),
        image: None,
    };
    input.image = store_image(&state, "category", form.file(IMAGE_FIELD)).await?;

    let category = match CategoryRepository::new(state.pool()).create(&input).await {
        Ok(category) => category,
        Err(e) => {
            state.images().delete_quietly(input.image.as_deref()).await;
            return Err(e.into());
        }
    };

    state.catalog().invalidate_all().await;
    info!(category_id = %category.id, name = %category.name, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /api/categories/{id}`
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    multipart: Multipart,
) -> Result<Json<Category>> {
    let form = MultipartForm::parse(multipart, 1).await?;
    let repo = CategoryRepository::new(state.pool());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let uploaded = store_image(&state, "category", form.file(IMAGE_FIELD)).await?;
    let input = CategoryInput {
        name: form.text("name").unwrap_or_else(|| current.name.clone()),
        description: form.text("description").or_else(|| current.description.clone()),
        image: uploaded.clone().or_else(|| current.image.clone()),
    };

    let category = match repo.update(id, &input).await {
        Ok(category) => category,
        Err(e) => {
            state.images().delete_quietly(uploaded.as_deref()).await;
            return Err(not_found_as(e, "Category not found"));
        }
    };

    if uploaded.is_some() {
        state.images().delete_quietly(current.image.as_deref()).await;
    }

    state.catalog().invalidate_all().await;
    info!(category_id = %category.id, "Category updated");
    Ok(Json(category))
}

/// `DELETE /api/categories/{id}`
///
/// Products keep their category name; the category is only a label.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<Value>> {
    let category = CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| not_found_as(e, "Category not found"))?;

    state.images().delete_quietly(category.image.as_deref()).await;
    state.catalog().invalidate_all().await;

    info!(category_id = %id, "Category deleted");
    Ok(Json(json!({ "message": "Category removed" })))
}
