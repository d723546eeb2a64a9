//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and serialize with camelCase field names,
//! which is the JSON shape the storefront API serves.

pub mod catalog;
pub mod order;
pub mod session;
pub mod user;

pub use catalog::{
    Category, CategoryInput, DEFAULT_CATEGORY, HeroSlide, HeroSlideInput, MAX_PRODUCT_IMAGES,
    Marquee, PackagingOption, PackagingOptionInput, Product, ProductInput,
};
pub use order::{Order, OrderCustomer, OrderItem};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserProfile};
