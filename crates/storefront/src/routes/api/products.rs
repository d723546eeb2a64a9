//! Product API handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use jewelbox_core::{Money, ProductId};

use super::form::MultipartForm;
use super::store_images;
use crate::db::{ProductFilter, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{DEFAULT_CATEGORY, MAX_PRODUCT_IMAGES, Product, ProductInput};
use crate::state::AppState;

const IMAGE_FIELD: &str = "images";

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
}

/// `GET /api/products`
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter::from_query(query.keyword.as_deref(), query.category.as_deref());
    Ok(Json(state.catalog().products(&filter).await?))
}

/// `GET /api/products/{id}`
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .catalog()
        .product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// A discount of zero means "no discount".
fn discount(form: &MultipartForm) -> Result<Option<Option<Money>>> {
    Ok(form
        .raw("discountPrice")
        .map(|_| form.money("discountPrice"))
        .transpose()?
        .map(|amount| amount.filter(|m| !m.is_zero())))
}

fn stock(form: &MultipartForm) -> Result<Option<i32>> {
    match form.parsed::<i32>("stock")? {
        Some(stock) if stock < 0 => Err(AppError::BadRequest(
            "stock cannot be negative".to_string(),
        )),
        other => Ok(other),
    }
}

/// Build a new product from the form, without images.
fn new_product(form: &MultipartForm) -> Result<ProductInput> {
    Ok(ProductInput {
        name: form.required("name")?,
        description: form.required("description")?,
        price: form
            .money("price")?
            .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?,
        discount_price: discount(form)?.flatten(),
        stock: Some(stock(form)?.unwrap_or(0)),
        images: Vec::new(),
        category: form
            .text("category")
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        featured: form.flag("featured").unwrap_or(false),
        packaging_eligible: form.flag("isCustomPackagingAvailable").unwrap_or(true),
    })
}

/// Overlay submitted fields on an existing product. Blank text keeps the
/// current value; stock is left to the database unless it was sent.
fn merge_product(current: &Product, form: &MultipartForm) -> Result<ProductInput> {
    let mut input = ProductInput::from(current);
    if let Some(name) = form.text("name") {
        input.name = name;
    }
    if let Some(description) = form.text("description") {
        input.description = description;
    }
    if let Some(price) = form.money("price")? {
        input.price = price;
    }
    if let Some(discount_price) = discount(form)? {
        input.discount_price = discount_price;
    }
    input.stock = stock(form)?;
    if let Some(category) = form.text("category") {
        input.category = category;
    }
    if let Some(featured) = form.flag("featured") {
        input.featured = featured;
    }
    if let Some(eligible) = form.flag("isCustomPackagingAvailable") {
        input.packaging_eligible = eligible;
    }
    Ok(input)
}

/// `POST /api/products`
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let form = MultipartForm::parse(multipart, MAX_PRODUCT_IMAGES).await?;
    let mut input = new_product(&form)?;
    input.images = store_images(&state, "product", form.files(IMAGE_FIELD)).await?;

    let created = ProductRepository::new(state.pool()).create(&input).await;
    let product = match created {
        Ok(product) => product,
        Err(e) => {
            state
                .images()
                .delete_quietly(input.images.iter().map(String::as_str))
                .await;
            return Err(e.into());
        }
    };

    state.catalog().invalidate_all().await;
    info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}`
///
/// New images replace the whole gallery; the old files are removed once the
/// row is updated.
#[instrument(skip(state, admin, multipart), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<Product>> {
    let form = MultipartForm::parse(multipart, MAX_PRODUCT_IMAGES).await?;
    let repo = ProductRepository::new(state.pool());
    let current = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let mut input = merge_product(&current, &form)?;
    let uploaded = store_images(&state, "product", form.files(IMAGE_FIELD)).await?;
    let replaced = !uploaded.is_empty();
    if replaced {
        input.images = uploaded;
    }

    let product = match repo.update(id, &input).await {
        Ok(product) => product,
        Err(e) => {
            if replaced {
                state
                    .images()
                    .delete_quietly(input.images.iter().map(String::as_str))
                    .await;
            }
            return Err(e.into());
        }
    };

    if replaced {
        let stale: Vec<String> = current
            .images
            .into_iter()
            .filter(|url| !product.images.contains(url))
            .collect();
        state
            .images()
            .delete_quietly(stale.iter().map(String::as_str))
            .await;
    }

    state.catalog().invalidate_all().await;
    info!(product_id = %product.id, "Product updated");
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    let product = ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| super::not_found_as(e, "Product not found"))?;

    state
        .images()
        .delete_quietly(product.images.iter().map(String::as_str))
        .await;
    state.catalog().invalidate_all().await;

    info!(product_id = %id, "Product deleted");
    Ok(Json(json!({ "message": "Product removed" })))
}
