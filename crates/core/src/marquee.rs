//! Site-wide marquee banner.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT: &str = "shows new collections out , collect now !";
pub const DEFAULT_BG_COLOR: &str = "theme";
pub const DEFAULT_TEXT_COLOR: &str = "white";

/// The banner as shown on every storefront page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarqueeSettings {
    pub text: String,
    pub is_active: bool,
    pub bg_color: String,
    pub text_color: String,
}

impl Default for MarqueeSettings {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_owned(),
            is_active: true,
            bg_color: DEFAULT_BG_COLOR.to_owned(),
            text_color: DEFAULT_TEXT_COLOR.to_owned(),
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarqueePatch {
    pub text: Option<String>,
    pub is_active: Option<bool>,
    pub bg_color: Option<String>,
    pub text_color: Option<String>,
}

impl MarqueeSettings {
    /// Apply `patch` over the current settings.
    #[must_use]
    pub fn apply(self, patch: MarqueePatch) -> Self {
        Self {
            text: patch.text.unwrap_or(self.text),
            is_active: patch.is_active.unwrap_or(self.is_active),
            bg_color: patch.bg_color.unwrap_or(self.bg_color),
            text_color: patch.text_color.unwrap_or(self.text_color),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = MarqueeSettings::default();
        assert_eq!(settings.text, "shows new collections out , collect now !");
        assert!(settings.is_active);
        assert_eq!(settings.bg_color, "theme");
        assert_eq!(settings.text_color, "white");
    }

    #[test]
    fn test_partial_patch_keeps_other_fields() {
        let patch: MarqueePatch = serde_json::from_str(r#"{"isActive": false}"#).unwrap();
        let updated = MarqueeSettings::default().apply(patch);
        assert!(!updated.is_active);
        assert_eq!(updated.text, DEFAULT_TEXT);
    }

    #[test]
    fn test_empty_text_is_applied() {
        let patch = MarqueePatch {
            text: Some(String::new()),
            ..MarqueePatch::default()
        };
        assert_eq!(MarqueeSettings::default().apply(patch).text, "");
    }
}
