//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration and password login (argon2)
//! - `catalog` - Cached catalog reads (moka)
//! - `checkout` - Order placement with stock reservation
//! - `images` - Image uploads to local disk or Cloudinary

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod images;

pub use auth::{AuthError, AuthService};
pub use catalog::CatalogService;
pub use checkout::{CheckoutError, CheckoutLine, CheckoutService};
pub use images::{ImageStore, ImageStoreError, UploadedImage};
