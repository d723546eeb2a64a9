//! Integration tests for Jewelbox.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate, create an admin, start the storefront
//! jb-cli migrate
//! JB_USER_PASSWORD=... jb-cli user create -e admin@jewelbox.test -n Admin -r admin
//! cargo run -p jewelbox-storefront
//!
//! # Run the ignored tests against it
//! JB_ADMIN_EMAIL=admin@jewelbox.test JB_ADMIN_PASSWORD=... \
//!     cargo test -p jewelbox-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `JB_BASE_URL` - storefront URL (default: `http://localhost:5000`)
//! - `JB_ADMIN_EMAIL`, `JB_ADMIN_PASSWORD` - an existing admin account

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use reqwest::{Client, StatusCode, multipart};
use serde_json::{Value, json};
use uuid::Uuid;

/// Storefront base URL.
#[must_use]
pub fn base_url() -> String {
    std::env::var("JB_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Full URL for an API path such as `/products`.
#[must_use]
pub fn api(path: &str) -> String {
    format!("{}/api{path}", base_url())
}

/// Client with a cookie jar so the session follows requests.
///
/// Each client also gets its own forwarded address so login rate limits
/// do not leak between tests.
#[must_use]
pub fn client() -> Client {
    let mut headers = reqwest::header::HeaderMap::new();
    let octet = Uuid::new_v4().as_bytes()[0];
    headers.insert(
        "x-forwarded-for",
        format!("10.0.0.{octet}")
            .parse()
            .expect("valid header value"),
    );
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// A throwaway email address.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@jewelbox.test", Uuid::new_v4().simple())
}

/// Register a new customer through the API and return its signed-in client.
pub async fn customer() -> (Client, Value) {
    let client = client();
    let resp = client
        .post(api("/users"))
        .json(&json!({
            "name": "Test Customer",
            "email": unique_email(),
            "password": "correct-horse-9",
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let profile = resp.json().await.expect("Invalid profile JSON");
    (client, profile)
}

/// Sign in as the configured admin.
pub async fn admin() -> Client {
    let email = std::env::var("JB_ADMIN_EMAIL").expect("JB_ADMIN_EMAIL not set");
    let password = std::env::var("JB_ADMIN_PASSWORD").expect("JB_ADMIN_PASSWORD not set");

    let client = client();
    let resp = client
        .post(api("/users/auth"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to sign in");
    assert_eq!(resp.status(), StatusCode::OK);
    client
}

/// Create a product as admin. Returns the product JSON.
pub async fn create_product(admin: &Client, name: &str, price: &str, stock: i32) -> Value {
    let form = multipart::Form::new()
        .text("name", name.to_string())
        .text("description", "Integration test piece")
        .text("price", price.to_string())
        .text("stock", stock.to_string())
        .text("category", "Rings");

    let resp = admin
        .post(api("/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("Invalid product JSON")
}

/// Delete a product as admin, ignoring failures.
pub async fn delete_product(admin: &Client, id: &Value) {
    let _ = admin.delete(api(&format!("/products/{id}"))).send().await;
}

/// A complete shipping address.
#[must_use]
pub fn shipping_address() -> Value {
    json!({
        "address": "1 Jewel Street",
        "city": "Jaipur",
        "postalCode": "302001",
        "country": "India",
    })
}
