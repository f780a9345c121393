//! Shared UI crate for Vibe Card. Model, drag interaction, export and views live here;
//! the `web` and `desktop` crates only launch it.

pub mod card;
pub mod core;
pub mod export;
pub mod i18n;
pub mod views;

pub mod components {
    mod locale_switcher;
    pub use locale_switcher::LocaleSwitcher;
}

pub use views::VibeCardPage;

/// Unified theme, inlined by both launchers.
pub const THEME_CSS: &str = include_str!("../assets/theme/main.css");
