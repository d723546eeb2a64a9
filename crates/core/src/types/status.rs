//! Role and variant enums shared between the database, the API and templates.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Shopper: can place and view their own orders.
    #[default]
    Customer,
    /// Full catalog and order management.
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

/// What a hero slide links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.hero_variant", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum HeroVariant {
    /// Slide promotes a product and links to it.
    #[default]
    Product,
    /// Teaser for an upcoming collection; never links to a product.
    ComingSoon,
}

impl HeroVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::ComingSoon => "coming_soon",
        }
    }
}

impl fmt::Display for HeroVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeroVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "product" => Ok(Self::Product),
            "coming_soon" => Ok(Self::ComingSoon),
            other => Err(UnknownVariant::new("hero variant", other)),
        }
    }
}

/// Slot a packaging option fills in a [`crate::PackagingSelection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.packaging_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PackagingKind {
    Box,
    Cloth,
    Cushion,
    Ribbon,
}

impl PackagingKind {
    /// All kinds in display order.
    pub const ALL: [Self; 4] = [Self::Box, Self::Cloth, Self::Cushion, Self::Ribbon];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Cloth => "cloth",
            Self::Cushion => "cushion",
            Self::Ribbon => "ribbon",
        }
    }

    /// Human label used on the product page.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Box => "Box colour",
            Self::Cloth => "Inner cloth",
            Self::Cushion => "Cushion",
            Self::Ribbon => "Ribbon colour",
        }
    }
}

impl fmt::Display for PackagingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackagingKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(Self::Box),
            "cloth" => Ok(Self::Cloth),
            "cushion" => Ok(Self::Cushion),
            "ribbon" => Ok(Self::Ribbon),
            other => Err(UnknownVariant::new("packaging kind", other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!(" customer ".parse::<UserRole>().unwrap(), UserRole::Customer);
        assert!("owner".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_default_is_customer() {
        assert_eq!(UserRole::default(), UserRole::Customer);
        assert!(!UserRole::default().is_admin());
    }

    #[test]
    fn test_hero_variant_serde_matches_display() {
        let json = serde_json::to_string(&HeroVariant::ComingSoon).unwrap();
        assert_eq!(json, "\"coming_soon\"");
        assert_eq!(HeroVariant::ComingSoon.to_string(), "coming_soon");
        assert_eq!(
            "coming_soon".parse::<HeroVariant>().unwrap(),
            HeroVariant::ComingSoon
        );
    }

    #[test]
    fn test_packaging_kind_roundtrips_through_str() {
        for kind in PackagingKind::ALL {
            assert_eq!(kind.as_str().parse::<PackagingKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_variant_message() {
        let err = "velvet".parse::<PackagingKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown packaging kind: velvet");
    }
}
