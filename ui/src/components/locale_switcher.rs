use dioxus::prelude::*;
use tracing::debug;

use crate::i18n;
use crate::t;

/// Compact language picker. Hidden when only one locale is embedded.
///
/// Platforms provide a `Signal<String>` language code in context; components that read it
/// re-render after a switch and pull fresh strings through `t!`.
#[component]
pub fn LocaleSwitcher() -> Element {
    i18n::init();

    let lang_code: Option<Signal<String>> = try_use_context::<Signal<String>>();
    let mut current = use_signal(|| {
        lang_code
            .as_ref()
            .map(|code| code())
            .unwrap_or_else(i18n::current_language)
    });
    let langs = use_signal(i18n::available_languages);

    if langs().len() <= 1 {
        return rsx! {};
    }

    let on_change = move |evt: FormEvent| {
        let value = evt.value();
        match i18n::set_language(&value) {
            Ok(()) => {
                debug!(lang = %value, "language switched");
                current.set(value.clone());
                if let Some(mut code) = lang_code {
                    code.set(value);
                }
            }
            Err(err) => tracing::warn!(lang = %value, error = %err, "language switch failed"),
        }
    };

    rsx! {
        div { class: "locale-switcher",
            label { class: "visually-hidden", r#for: "locale-select", {t!("locale-label")} }
            select {
                id: "locale-select",
                value: "{current()}",
                oninput: on_change,
                for code in langs() {
                    option { key: "{code}", value: "{code}", "{code}" }
                }
            }
        }
    }
}
