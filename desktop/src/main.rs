#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use dioxus::logger::tracing::Level;
#[cfg(feature = "desktop")]
use dioxus::desktop::{tao::window::WindowBuilder, Config, LogicalSize};
use dioxus::prelude::*;

use ui::{i18n, VibeCardPage, THEME_CSS};

#[cfg(feature = "desktop")]
fn main() {
    dioxus::logger::init(Level::INFO).expect("failed to initialise logger");

    LaunchBuilder::desktop()
        .with_cfg(
            Config::new().with_window(
                WindowBuilder::new()
                    .with_title(format!("Vibe Card – v{}", env!("CARGO_PKG_VERSION")))
                    .with_inner_size(LogicalSize::new(640.0, 1000.0)),
            ),
        )
        .launch(App);
}

#[cfg(all(feature = "server", not(feature = "desktop")))]
fn main() {
    dioxus::logger::init(Level::INFO).expect("failed to initialise logger");
    LaunchBuilder::server().launch(App);
}

#[component]
fn App() -> Element {
    i18n::init();

    // Global language code; the locale switcher writes it, localized components read it.
    let lang_code = use_signal(i18n::current_language);
    use_context_provider(|| lang_code);

    rsx! {
        // Always inline the shared theme; desktop builds ship no asset directory.
        document::Style { "{THEME_CSS}" }

        VibeCardPage {}
    }
}
