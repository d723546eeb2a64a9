//! Catalog records: products, categories, hero slides, the marquee and
//! packaging options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jewelbox_core::marquee::MarqueeSettings;
use jewelbox_core::{
    CategoryId, HeroSlideId, HeroVariant, Money, PackagingKind, PackagingOptionId, ProductId,
};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Maximum images per product.
pub const MAX_PRODUCT_IMAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub discount_price: Option<Money>,
    pub stock: i32,
    pub images: Vec<String>,
    pub category: String,
    pub featured: bool,
    #[serde(rename = "isCustomPackagingAvailable")]
    pub packaging_eligible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a buyer pays per unit: the discount price when it is set
    /// and below the list price, otherwise the list price.
    #[must_use]
    pub fn effective_price(&self) -> Money {
        match self.discount_price {
            Some(discount) if !discount.is_zero() && discount < self.price => discount,
            _ => self.price,
        }
    }

    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.effective_price() != self.price
    }

    /// Stock as an unsigned count (negative values never reach the table).
    #[must_use]
    pub fn stock_count(&self) -> u32 {
        u32::try_from(self.stock).unwrap_or(0)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Fields written by product create/update.
///
/// `stock` is `None` unless the admin sent it: checkouts decrement stock
/// concurrently, so an update only writes the column when asked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub discount_price: Option<Money>,
    pub stock: Option<i32>,
    pub images: Vec<String>,
    pub category: String,
    pub featured: bool,
    pub packaging_eligible: bool,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            discount_price: product.discount_price,
            stock: None,
            images: product.images.clone(),
            category: product.category.clone(),
            featured: product.featured,
            packaging_eligible: product.packaging_eligible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    pub id: HeroSlideId,
    pub image: String,
    pub heading: String,
    pub sub_heading: String,
    pub description: String,
    pub product_code: String,
    pub is_active: bool,
    #[serde(rename = "type")]
    pub variant: HeroVariant,
    pub product_id: Option<ProductId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroSlideInput {
    pub image: String,
    pub heading: String,
    pub sub_heading: String,
    pub description: String,
    pub product_code: String,
    pub is_active: bool,
    pub variant: HeroVariant,
    pub product_id: Option<ProductId>,
}

impl From<&HeroSlide> for HeroSlideInput {
    fn from(slide: &HeroSlide) -> Self {
        Self {
            image: slide.image.clone(),
            heading: slide.heading.clone(),
            sub_heading: slide.sub_heading.clone(),
            description: slide.description.clone(),
            product_code: slide.product_code.clone(),
            is_active: slide.is_active,
            variant: slide.variant,
            product_id: slide.product_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Marquee {
    pub text: String,
    pub is_active: bool,
    pub bg_color: String,
    pub text_color: String,
    pub updated_at: DateTime<Utc>,
}

impl Marquee {
    #[must_use]
    pub fn settings(&self) -> MarqueeSettings {
        MarqueeSettings {
            text: self.text.clone(),
            is_active: self.is_active,
            bg_color: self.bg_color.clone(),
            text_color: self.text_color.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PackagingOption {
    pub id: PackagingOptionId,
    #[serde(rename = "type")]
    pub kind: PackagingKind,
    pub name: String,
    pub price: Money,
    pub color_code: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Packaging option create/update body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingOptionInput {
    #[serde(rename = "type")]
    pub kind: PackagingKind,
    pub name: String,
    #[serde(default)]
    pub price: Money,
    #[serde(default)]
    pub color_code: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: &str, discount: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Pearl drop earrings".to_owned(),
            description: "Freshwater pearls".to_owned(),
            price: Money::parse(price).unwrap(),
            discount_price: discount.map(|d| Money::parse(d).unwrap()),
            stock: 3,
            images: vec!["/uploads/a.jpg".to_owned()],
            category: DEFAULT_CATEGORY.to_owned(),
            featured: false,
            packaging_eligible: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_uses_lower_discount() {
        let p = product("100", Some("80"));
        assert_eq!(p.effective_price(), Money::parse("80").unwrap());
        assert!(p.is_discounted());
    }

    #[test]
    fn test_zero_or_higher_discount_is_ignored() {
        assert_eq!(
            product("100", Some("0")).effective_price(),
            Money::parse("100").unwrap()
        );
        assert_eq!(
            product("100", Some("120")).effective_price(),
            Money::parse("100").unwrap()
        );
        assert!(!product("100", None).is_discounted());
    }

    #[test]
    fn test_product_json_uses_storefront_field_names() {
        let value = serde_json::to_value(product("10", None)).unwrap();
        assert_eq!(value["isCustomPackagingAvailable"], true);
        assert_eq!(value["discountPrice"], serde_json::Value::Null);
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_packaging_input_defaults_price_to_zero() {
        let input: PackagingOptionInput =
            serde_json::from_str(r#"{"type":"ribbon","name":"Gold"}"#).unwrap();
        assert_eq!(input.kind, PackagingKind::Ribbon);
        assert_eq!(input.price, Money::ZERO);
    }
}
