use std::rc::Rc;

use dioxus::prelude::*;

use crate::card::{CardLabels, CardView, VibeCard};
use crate::components::LocaleSwitcher;
use crate::core::dimensions::DimensionId;
use crate::core::model::{PresetBook, PresetKey};
use crate::core::slider::PointerCapture;
use crate::export::{self, ExportOutcome, RasterTarget};
use crate::t;

pub const PROJECT_URL: &str = "https://github.com/KaseyMarkel/vibe-card";

/// Prompt users paste when asking a model to fill in a card. Kept verbatim in every locale.
pub const VERIFICATION_PROMPT: &str = "Before filling in the model field on this Vibe Card:
1. State your exact model name and version string
   (e.g. \"Claude Opus 4.6\", \"GPT-4o\", \"Gemini 2.0 Flash\")
2. State today's date
3. Do NOT guess or round — if you are uncertain of
   your own version number, say so explicitly
4. The human will verify and correct if needed";

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Saved(String),
    Failed(String),
}

fn preset_label(key: PresetKey) -> String {
    match key {
        PresetKey::Example => t!("preset-example"),
        PresetKey::Custom => t!("preset-custom"),
    }
}

fn preset_button_class(active: bool) -> &'static str {
    if active {
        "button preset-picker__button preset-picker__button--active"
    } else {
        "button preset-picker__button"
    }
}

#[component]
pub fn VibeCardPage() -> Element {
    // Subscribe to the platform language signal so a switch re-renders the chrome.
    let _lang = try_use_context::<Signal<String>>().map(|code| code());

    let mut book = use_signal(PresetBook::default);
    let mut show_both = use_signal(|| true);
    let mut exporting = use_signal(|| false);
    let mut status = use_signal(|| ExportStatus::Idle);
    let capture = use_context_provider(PointerCapture::new);
    let exporter = use_hook(|| Rc::new(export::platform_exporter()));

    let on_change = move |(dimension, percent): (DimensionId, u8)| {
        book.with_mut(|book| book.set_human_value(dimension, percent));
    };

    let on_export = move |_| {
        if exporting() {
            return;
        }
        let preset = book.read().active().clone();
        let target = RasterTarget::new(
            CardView::build(&preset, show_both()),
            CardLabels::localized(),
        );
        let exporter = exporter.clone();
        exporting.set(true);
        status.set(ExportStatus::Idle);
        spawn(async move {
            match exporter.export(&target, &preset.title).await {
                Ok(ExportOutcome::Saved { filename, location }) => {
                    status.set(ExportStatus::Saved(location.unwrap_or(filename)));
                }
                Ok(ExportOutcome::Skipped) => {}
                Err(err) => status.set(ExportStatus::Failed(err.to_string())),
            }
            exporting.set(exporter.is_busy());
        });
    };

    let feedback = match status() {
        ExportStatus::Idle => None,
        ExportStatus::Saved(location) => Some((
            "export-status export-status--success",
            t!("export-saved", location = location),
        )),
        ExportStatus::Failed(reason) => Some((
            "export-status export-status--error",
            t!("export-failed", reason = reason),
        )),
    };

    let active = book.read().active_key();
    let preset = book.read().active().clone();
    let proposals_on = show_both();
    let busy = exporting();
    let switch_class = if proposals_on { "switch switch--on" } else { "switch" };

    let on_move = {
        let capture = capture.clone();
        move |evt: PointerEvent| capture.dispatch_move(evt.client_coordinates().x)
    };
    let on_up = {
        let capture = capture.clone();
        move |_: PointerEvent| capture.dispatch_end()
    };
    let on_cancel = {
        let capture = capture.clone();
        move |_: PointerEvent| capture.dispatch_end()
    };
    // The root fills the viewport, so leaving it means leaving the window.
    let on_leave = move |_: PointerEvent| capture.dispatch_end();

    rsx! {
        div {
            class: "page vibe-page",
            onpointermove: on_move,
            onpointerup: on_up,
            onpointercancel: on_cancel,
            onpointerleave: on_leave,

            header { class: "vibe-page__header",
                h1 { class: "vibe-page__title", {t!("page-title")} }
                p { class: "vibe-page__tagline",
                    {t!("page-tagline")}
                    br {}
                    {t!("page-instructions")}
                }
                LocaleSwitcher {}
            }

            div {
                class: "preset-picker",
                role: "group",
                aria_label: t!("preset-group-label"),
                for key in PresetKey::ALL {
                    button {
                        key: "{key.key()}",
                        class: preset_button_class(key == active),
                        aria_pressed: "{key == active}",
                        onclick: move |_| book.with_mut(|book| book.select(key)),
                        {preset_label(key)}
                    }
                }
            }

            div { class: "proposal-toggle",
                span { class: "proposal-toggle__label", {t!("toggle-proposed")} }
                button {
                    class: switch_class,
                    role: "switch",
                    aria_checked: "{proposals_on}",
                    aria_label: t!("toggle-proposed"),
                    onclick: move |_| show_both.set(!proposals_on),
                    span { class: "switch__knob" }
                }
            }

            div { class: "howto",
                p {
                    span { class: "howto__label", {t!("howto-label")} }
                    " "
                    {t!("howto-body")}
                    " "
                    strong { {t!("howto-action")} }
                    " "
                    {t!("howto-tail")}
                }
            }

            VibeCard { preset, show_both: proposals_on, on_change }

            button {
                class: "button button--primary export-button",
                disabled: busy,
                aria_busy: "{busy}",
                onclick: on_export,
                if busy { {t!("export-busy")} } else { {t!("export-idle")} }
            }
            if let Some((class, message)) = feedback {
                p { class: class, role: "status", "{message}" }
            }

            details { class: "verify-prompt",
                summary { class: "verify-prompt__summary",
                    span { {t!("verify-summary")} }
                }
                div { class: "verify-prompt__body",
                    p { {t!("verify-intro")} }
                    pre { class: "verify-prompt__text", "{VERIFICATION_PROMPT}" }
                }
            }

            footer { class: "vibe-page__footer",
                a { href: PROJECT_URL, "GitHub" }
                " · "
                {t!("footer-license")}
                " · "
                {t!("footer-tagline")}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_four_steps() {
        let steps = VERIFICATION_PROMPT
            .lines()
            .filter(|line| line.chars().next().is_some_and(|c| c.is_ascii_digit()))
            .count();
        assert_eq!(steps, 4);
    }
}
