//! Internationalization support for `vibecard-ui`.
//!
//! This module wires together:
//! - `i18n-embed` (language selection + asset loading)
//! - `fluent` (message formatting)
//! - `rust-embed` (compile-time embedding of `.ftl` files)
//! - `i18n-embed-fl` (`fl!` macro for compile-time checked lookups)
//!
//! Folder layout (relative to this crate root):
//! ```text
//! i18n.toml
//! i18n/
//!   en-US/vibecard_ui.ftl   (fallback/reference)
//!   es-ES/vibecard_ui.ftl
//!   fr-FR/vibecard_ui.ftl
//! ```
//!
//! Usage in a component (after calling `i18n::init()` once at app start):
//! ```ignore
//! use crate::t;
//! crate::i18n::init(); // idempotent
//! let label = t!("export-idle");
//! let saved = t!("export-saved", location = "vibe_card_demo.png");
//! ```
//!
//! Adding a locale: copy `en-US/vibecard_ui.ftl` to `i18n/<lang-id>/vibecard_ui.ftl`,
//! translate the values (IDs and placeholders stay identical), then register it in
//! `tests/i18n_keys.rs`.
//!
//! Desktop builds request languages from the OS, web builds from `navigator.languages`.
//! Assets are always embedded on WASM (`debug-embed`).
//!
//! Only the page chrome is localized. Dimension labels, presets and the card eyebrow stay
//! in English so exported cards read the same everywhere.
use std::sync::Once;

use i18n_embed::fluent::FluentLanguageLoader;
use i18n_embed::LanguageLoader;
use once_cell::sync::Lazy;
use rust_embed::Embed;
use tracing::warn;
use unic_langid::LanguageIdentifier;

pub use i18n_embed_fl::fl;

/// Ergonomic translation macro.
/// Examples:
///     t!("export-idle")
///     t!("export-failed", reason = err.to_string())
///
/// Expands to `fl!(&*LOADER, ...)` so every lookup routes through the shared loader.
#[macro_export]
macro_rules! t {
    ($key:literal) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key)
    };
    ($key:literal, $( $arg:ident = $value:expr ),+ $(,)?) => {
        $crate::i18n::fl!(&*$crate::i18n::LOADER, $key, $( $arg = $value ),+ )
    };
}

/// Fluent domain; `fl!` derives the same name from the package name (dashes become
/// underscores), so the fallback file is `i18n/en-US/{DOMAIN}.ftl`.
const DOMAIN: &str = "vibecard_ui";

pub const FALLBACK_LANGUAGE: &str = "en-US";

#[derive(Embed)]
#[folder = "i18n"]
struct Localizations;

/// Global language loader used with the `fl!` macro.
pub static LOADER: Lazy<FluentLanguageLoader> = Lazy::new(|| {
    let fallback: LanguageIdentifier = FALLBACK_LANGUAGE
        .parse()
        .unwrap_or_else(|_| LanguageIdentifier::default());
    FluentLanguageLoader::new(DOMAIN, fallback)
});

static INIT: Once = Once::new();

/// Initialize i18n (idempotent).
pub fn init() {
    INIT.call_once(|| {
        let requested = requested_languages();
        if let Err(err) = i18n_embed::select(&*LOADER, &Localizations, &requested) {
            warn!(error = %err, "failed selecting languages; continuing with fallback");
        }
    });
}

/// Switch language at runtime. An unparsable `tag` is ignored.
pub fn set_language(tag: &str) -> Result<(), i18n_embed::I18nEmbedError> {
    let Ok(lang) = tag.parse::<LanguageIdentifier>() else {
        return Ok(());
    };
    i18n_embed::select(&*LOADER, &Localizations, &[lang]).map(|_| ())
}

/// Tag of the language currently used for lookups.
pub fn current_language() -> String {
    LOADER.current_language().to_string()
}

/// Embedded language identifiers, sorted.
pub fn available_languages() -> Vec<String> {
    let mut langs = Localizations::iter()
        .filter_map(|path| path.split('/').next().map(|s| s.to_string()))
        .collect::<Vec<_>>();
    langs.sort();
    langs.dedup();
    langs
}

#[cfg(target_arch = "wasm32")]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::WebLanguageRequester::requested_languages()
}

#[cfg(not(target_arch = "wasm32"))]
fn requested_languages() -> Vec<LanguageIdentifier> {
    i18n_embed::DesktopLanguageRequester::requested_languages()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() {
        init();
        set_language(FALLBACK_LANGUAGE).unwrap();
    }

    #[test]
    fn domain_matches_package_name() {
        assert_eq!(DOMAIN, env!("CARGO_PKG_NAME").replace('-', "_"));
        for lang in available_languages() {
            let path = format!("{lang}/{DOMAIN}.ftl");
            assert!(Localizations::get(&path).is_some(), "missing {path}");
        }
    }

    #[test]
    fn shipped_languages_are_embedded() {
        assert_eq!(available_languages(), vec!["en-US", "es-ES", "fr-FR"]);
    }

    #[test]
    fn fallback_lookup_works() {
        english();
        let s = fl!(&*LOADER, "card-column-human");
        assert_eq!(s, "Human");
    }

    #[test]
    fn placeholders_are_filled() {
        english();
        let s = fl!(&*LOADER, "export-failed", reason = "offline");
        assert!(s.contains("offline"));
    }

    #[test]
    fn invalid_tag_is_ignored() {
        english();
        let before = fl!(&*LOADER, "export-idle");
        assert!(set_language("not a tag!").is_ok());
        assert_eq!(fl!(&*LOADER, "export-idle"), before);
    }
}
