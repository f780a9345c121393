use dioxus::logger::tracing::Level;
use dioxus::prelude::*;

use ui::{i18n, VibeCardPage, THEME_CSS};

fn main() {
    dioxus::logger::init(Level::INFO).expect("failed to initialise logger");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    i18n::init();

    // Global language code; the locale switcher writes it, localized components read it.
    let lang_code = use_signal(i18n::current_language);
    use_context_provider(|| lang_code);

    rsx! {
        document::Title { "Vibe Card" }
        document::Style { "{THEME_CSS}" }

        VibeCardPage {}
    }
}
