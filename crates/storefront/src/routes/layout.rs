//! Data every storefront page needs for the shared layout.

use tower_sessions::Session;
use tracing::warn;

use jewelbox_core::marquee::MarqueeSettings;

use crate::models::CurrentUser;
use crate::state::AppState;

use super::cart::load_cart;

/// Header, banner and cart badge.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user: Option<CurrentUser>,
    pub cart_count: u32,
    /// Present only while the banner is switched on.
    pub marquee: Option<MarqueeSettings>,
}

impl Layout {
    /// Gather layout data. Failures degrade to an empty badge or no banner
    /// rather than failing the page.
    pub async fn load(state: &AppState, session: &Session, user: Option<CurrentUser>) -> Self {
        let cart_count = match load_cart(session).await {
            Ok(cart) => cart.item_count(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart for layout");
                0
            }
        };

        let marquee = match state.catalog().marquee().await {
            Ok(marquee) => Some(marquee.settings()).filter(|m| m.is_active),
            Err(e) => {
                warn!(error = %e, "Failed to load marquee");
                None
            }
        };

        Self {
            user,
            cart_count,
            marquee,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(CurrentUser::is_admin)
    }

    /// Inline style for the banner. `theme` means the stylesheet's accent.
    pub fn marquee_style(&self) -> String {
        self.marquee.as_ref().map_or_else(String::new, |m| {
            let bg = if m.bg_color == "theme" {
                "var(--accent)"
            } else {
                m.bg_color.as_str()
            };
            format!(
                "background:{};color:{}",
                sanitize_css(bg),
                sanitize_css(&m.text_color)
            )
        })
    }
}

/// Keep only characters that can appear in a CSS colour value.
fn sanitize_css(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '-' | ' ' | '%'))
        .collect()
}
