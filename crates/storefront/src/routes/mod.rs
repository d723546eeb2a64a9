//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /shop                   - Product listing (?keyword=&category=)
//! GET  /products/{id}          - Product detail with packaging choices
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add or replace a line
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Address form and summary
//! POST /checkout               - Place the order
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action (rate limited)
//! GET  /register               - Register page
//! POST /register               - Register action
//! POST /logout                 - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Order history
//!
//! # Admin (requires admin)
//! GET  /admin                  - Dashboard
//!
//! # REST API
//! /api/...                     - See [`api`]
//! ```

pub mod account;
pub mod admin;
pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod layout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(auth::login_page).merge(post(auth::login).layer(login_rate_limiter())),
        )
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/shop", get(products::index))
        .route("/products/{id}", get(products::show))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::place))
        .route("/account", get(account::index))
        .route("/admin", get(admin::dashboard))
        .merge(auth_routes())
        .nest("/api", api::routes())
        .fallback(products::not_found)
}
