//! Jewelbox Core - Shared domain library.
//!
//! This crate provides the types and pure business rules used by:
//! - `storefront` - REST API, server-rendered shop and admin dashboard
//! - `cli` - Command-line tools for migrations, users and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and arithmetic - no I/O, no database
//! access, no HTTP clients. Database encoding is opt-in via the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, emails and role/variant enums
//! - [`cart`] - Cart aggregator (upsert-by-product, totals)
//! - [`packaging`] - Gift packaging selection and pricing
//! - [`order`] - Shipping address and order totals
//! - [`hero`] - Hero slide product-link rule
//! - [`marquee`] - Marquee banner settings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod hero;
pub mod marquee;
pub mod order;
pub mod packaging;
pub mod types;

pub use cart::{Cart, CartError, CartItem};
pub use packaging::{PackagingChoice, PackagingSelection};
pub use types::*;
