//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `account` - Customers and admins (argon2 password hashes)
//! - `product`, `category` - Catalog
//! - `hero_slide` - Home page carousel
//! - `marquee` - Single-row banner settings
//! - `packaging_option` - Gift packaging choices
//! - `customer_order`, `order_item` - Orders with line snapshots
//! - `session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p jewelbox-cli -- migrate
//! ```

pub mod categories;
pub mod hero;
pub mod marquee;
pub mod orders;
pub mod packaging;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use categories::CategoryRepository;
pub use hero::HeroRepository;
pub use marquee::MarqueeRepository;
pub use orders::{NewOrder, NewOrderItem, OrderRepository};
pub use packaging::PackagingRepository;
pub use products::{ProductFilter, ProductRepository};
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-key violation to `Conflict(message)`, anything else to
    /// `Database`.
    pub(crate) fn on_unique(message: &str) -> impl FnOnce(sqlx::Error) -> Self + '_ {
        move |e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return Self::Conflict(message.to_owned());
            }
            Self::Database(e)
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
