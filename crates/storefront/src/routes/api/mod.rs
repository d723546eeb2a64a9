//! JSON REST API under `/api`.
//!
//! Reads are public and served through the catalog cache. Writes require an
//! admin session, except checkout and the user endpoints. Image-bearing
//! writes (products, categories, hero slides) take `multipart/form-data`;
//! everything else is JSON.

pub mod categories;
pub mod form;
pub mod hero;
pub mod marquee;
pub mod orders;
pub mod packaging;
pub mod products;
pub mod users;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequest, OriginalUri},
    http::StatusCode,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::middleware::login_rate_limiter;
use crate::services::UploadedImage;
use crate::state::AppState;

/// Largest accepted request body (multipart uploads included).
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the API router, to be nested at `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Products
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        // Categories
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        // Hero slides
        .route("/hero", get(hero::active).post(hero::create))
        .route("/hero/all", get(hero::all))
        .route("/hero/{id}", put(hero::update).delete(hero::delete))
        // Marquee
        .route("/marquee", get(marquee::show).put(marquee::update))
        // Packaging options
        .route("/packaging", get(packaging::index).post(packaging::create))
        .route(
            "/packaging/{id}",
            put(packaging::update).delete(packaging::delete),
        )
        // Orders
        .route("/orders", get(orders::index).post(orders::create))
        .route("/orders/myorders", get(orders::mine))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/deliver", put(orders::deliver))
        // Users
        .route("/users", post(users::register))
        .route("/users/logout", post(users::logout))
        .route("/users/profile", get(users::profile))
        .merge(login_routes())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

async fn not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("Not Found - {}", uri.path()) })),
    )
}

/// Login, behind a per-IP rate limit.
fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/users/auth", post(users::login))
        .layer(login_rate_limiter())
}

/// JSON request body whose rejections answer `400 {"message"}` like every
/// other validation failure.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Turn a repository `NotFound` into a 404 with a resource-specific message.
pub(crate) fn not_found_as(err: RepositoryError, message: &str) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(message.to_string()),
        other => other.into(),
    }
}

/// Store every upload, returning their URLs in order. If one fails, the
/// ones already stored are removed.
pub(crate) async fn store_images<'a>(
    state: &AppState,
    prefix: &str,
    uploads: impl IntoIterator<Item = &'a UploadedImage>,
) -> Result<Vec<String>, AppError> {
    let mut urls = Vec::new();
    for upload in uploads {
        match state.images().save(prefix, upload).await {
            Ok(url) => urls.push(url),
            Err(e) => {
                state
                    .images()
                    .delete_quietly(urls.iter().map(String::as_str))
                    .await;
                return Err(e.into());
            }
        }
    }
    Ok(urls)
}

/// Store a single optional upload.
pub(crate) async fn store_image(
    state: &AppState,
    prefix: &str,
    upload: Option<&UploadedImage>,
) -> Result<Option<String>, AppError> {
    match upload {
        Some(upload) => Ok(Some(state.images().save(prefix, upload).await?)),
        None => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use axum::response::IntoResponse;

    use super::*;
    use crate::models::PackagingOptionInput;

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_bad_request() {
        let request = json_request(r#"{"type": "box", "name": "Red", "price": "1.239"}"#);
        let err = ApiJson::<PackagingOptionInput>::from_request(request, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_valid_json_body_is_extracted() {
        let request = json_request(r#"{"type": "ribbon", "name": "Gold", "price": "2.50"}"#);
        let ApiJson(input) = ApiJson::<PackagingOptionInput>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(input.name, "Gold");
    }
}
