//! Hero slide product-link rule.

use crate::types::{HeroVariant, ProductId};

/// A submitted product reference could not be read.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid product reference: {0}")]
pub struct InvalidProductRef(pub String);

/// Read a form-submitted product reference.
///
/// Browsers and older admin clients send `""`, `"null"` or `"undefined"` for
/// "no product"; all three mean `None`.
///
/// # Errors
///
/// Returns [`InvalidProductRef`] when the value is neither blank nor an id.
pub fn parse_product_ref(raw: Option<&str>) -> Result<Option<ProductId>, InvalidProductRef> {
    let Some(raw) = raw.map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() || raw == "null" || raw == "undefined" {
        return Ok(None);
    }
    raw.parse::<i32>()
        .map(|id| Some(ProductId::new(id)))
        .map_err(|_| InvalidProductRef(raw.to_owned()))
}

/// The product a slide links to once `variant` is taken into account.
/// Coming-soon slides never link to a product.
#[must_use]
pub const fn linked_product(variant: HeroVariant, product: Option<ProductId>) -> Option<ProductId> {
    match variant {
        HeroVariant::Product => product,
        HeroVariant::ComingSoon => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_values_mean_none() {
        for raw in ["", "  ", "null", "undefined"] {
            assert_eq!(parse_product_ref(Some(raw)).unwrap(), None, "{raw:?}");
        }
        assert_eq!(parse_product_ref(None).unwrap(), None);
    }

    #[test]
    fn test_numeric_reference() {
        assert_eq!(
            parse_product_ref(Some(" 17 ")).unwrap(),
            Some(ProductId::new(17))
        );
    }

    #[test]
    fn test_garbage_reference_is_rejected() {
        assert!(parse_product_ref(Some("abc")).is_err());
    }

    #[test]
    fn test_coming_soon_never_links() {
        let product = Some(ProductId::new(3));
        assert_eq!(linked_product(HeroVariant::ComingSoon, product), None);
        assert_eq!(linked_product(HeroVariant::Product, product), product);
    }
}
