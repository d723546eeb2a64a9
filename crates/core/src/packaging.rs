//! Gift packaging selected alongside a cart line.
//!
//! A selection fills up to four slots (box, cloth, cushion, ribbon), each with
//! a named, priced option, plus an optional gift message. The packaging price
//! is the sum of the chosen option prices and is charged once per unit.

use serde::{Deserialize, Serialize};

use crate::types::{Money, PackagingKind};

/// A single chosen packaging option, priced at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingChoice {
    pub name: String,
    pub price: Money,
}

impl PackagingChoice {
    #[must_use]
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// Packaging chosen for one cart line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_color: Option<PackagingChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_cloth: Option<PackagingChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cushion: Option<PackagingChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ribbon_color: Option<PackagingChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gift_message: Option<String>,
}

impl PackagingSelection {
    /// The option chosen for `kind`, if any.
    #[must_use]
    pub const fn choice(&self, kind: PackagingKind) -> Option<&PackagingChoice> {
        match kind {
            PackagingKind::Box => self.box_color.as_ref(),
            PackagingKind::Cloth => self.inner_cloth.as_ref(),
            PackagingKind::Cushion => self.cushion.as_ref(),
            PackagingKind::Ribbon => self.ribbon_color.as_ref(),
        }
    }

    /// Fill (or clear) the slot for `kind`.
    pub fn set(&mut self, kind: PackagingKind, choice: Option<PackagingChoice>) {
        let slot = match kind {
            PackagingKind::Box => &mut self.box_color,
            PackagingKind::Cloth => &mut self.inner_cloth,
            PackagingKind::Cushion => &mut self.cushion,
            PackagingKind::Ribbon => &mut self.ribbon_color,
        };
        *slot = choice;
    }

    /// Sum of the chosen option prices.
    #[must_use]
    pub fn price(&self) -> Money {
        PackagingKind::ALL
            .into_iter()
            .filter_map(|kind| self.choice(kind))
            .map(|choice| choice.price)
            .sum()
    }

    /// True when no slot is filled and there is no gift message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        PackagingKind::ALL
            .into_iter()
            .all(|kind| self.choice(kind).is_none())
            && self
                .gift_message
                .as_deref()
                .is_none_or(|m| m.trim().is_empty())
    }

    /// One-line description for order summaries, e.g.
    /// `"Box colour: Red, Ribbon colour: Gold"`.
    #[must_use]
    pub fn summary(&self) -> String {
        PackagingKind::ALL
            .into_iter()
            .filter_map(|kind| {
                self.choice(kind)
                    .map(|choice| format!("{}: {}", kind.label(), choice.name))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[test]
    fn test_empty_selection_is_free() {
        let selection = PackagingSelection::default();
        assert!(selection.is_empty());
        assert_eq!(selection.price(), Money::ZERO);
        assert_eq!(selection.summary(), "");
    }

    #[test]
    fn test_price_sums_chosen_options() {
        let mut selection = PackagingSelection::default();
        selection.set(PackagingKind::Box, Some(PackagingChoice::new("Red", money("6"))));
        selection.set(
            PackagingKind::Ribbon,
            Some(PackagingChoice::new("Gold", money("4.50"))),
        );
        assert_eq!(selection.price(), money("10.50"));
        assert_eq!(selection.summary(), "Box colour: Red, Ribbon colour: Gold");
    }

    #[test]
    fn test_set_none_clears_slot() {
        let mut selection = PackagingSelection::default();
        selection.set(PackagingKind::Cushion, Some(PackagingChoice::new("Velvet", money("2"))));
        selection.set(PackagingKind::Cushion, None);
        assert!(selection.choice(PackagingKind::Cushion).is_none());
        assert_eq!(selection.price(), Money::ZERO);
    }

    #[test]
    fn test_gift_message_alone_is_not_empty() {
        let selection = PackagingSelection {
            gift_message: Some("Happy birthday".to_owned()),
            ..PackagingSelection::default()
        };
        assert!(!selection.is_empty());
        assert_eq!(selection.price(), Money::ZERO);
    }

    #[test]
    fn test_json_field_names() {
        let selection = PackagingSelection {
            inner_cloth: Some(PackagingChoice::new("Silk", money("3"))),
            gift_message: Some("For you".to_owned()),
            ..PackagingSelection::default()
        };
        let value = serde_json::to_value(&selection).unwrap();
        assert_eq!(value["innerCloth"]["name"], "Silk");
        assert_eq!(value["giftMessage"], "For you");
        assert!(value.get("boxColor").is_none());
    }
}
