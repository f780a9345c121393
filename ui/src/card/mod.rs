//! The Vibe Card: presentation model, Dioxus components and SVG rendering.
//!
//! [`CardView::build`] decides what the card shows. Both the interactive component and
//! the SVG renderer used for native export consume it, so the two never drift apart.
//!
//! Two readings of "AI percentage" coexist on purpose:
//! - the label row shows `100 - human` under *Human* and `human` under *AI*;
//! - the proposed marker shows the separately stored `ai` value.
//!
//! The fill bar and handle sit at the stored `human` value so the handle follows the
//! pointer while dragging.

use dioxus::prelude::*;

use crate::core::dimensions::DimensionId;
use crate::core::format::{byline, format_percent};
use crate::core::model::{Preset, MAX_PERCENT};
use crate::t;

pub mod svg;
mod track;

pub use track::SliderTrack;

/// DOM id of the card root; the web rasterizer captures this element.
pub const CARD_ELEMENT_ID: &str = "vibe-card";

/// Brand line printed above the title.
pub const CARD_EYEBROW: &str = "Vibe Card";

/// One dimension row on the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRow {
    pub dimension: DimensionId,
    pub label: &'static str,
    pub icon: &'static str,
    /// Figure printed under the *Human* column (`100 - human`).
    pub human_figure: u8,
    /// Figure printed under the *AI* column (the stored human value).
    pub ai_figure: u8,
    /// Width of the fill bar and position of the handle.
    pub fill: u8,
    /// Read-only AI-proposed marker, present only when proposed values are shown.
    pub proposed: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendEntry {
    Human,
    AiProposed,
}

impl LegendEntry {
    fn swatch_class(self) -> &'static str {
        match self {
            LegendEntry::Human => "vibe-legend__swatch vibe-legend__swatch--human",
            LegendEntry::AiProposed => "vibe-legend__swatch vibe-legend__swatch--ai",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub title: String,
    pub byline: String,
    pub rows: Vec<CardRow>,
    pub legend: Vec<LegendEntry>,
}

impl CardView {
    pub fn build(preset: &Preset, show_both: bool) -> Self {
        let rows = preset
            .enabled_in_order()
            .map(|dim| {
                let info = dim.info();
                let human = preset.human[dim];
                CardRow {
                    dimension: dim,
                    label: info.label,
                    icon: info.icon,
                    human_figure: MAX_PERCENT - human,
                    ai_figure: human,
                    fill: human,
                    proposed: show_both.then(|| preset.ai[dim]),
                }
            })
            .collect();

        let legend = if show_both {
            vec![LegendEntry::Human, LegendEntry::AiProposed]
        } else {
            Vec::new()
        };

        Self {
            title: preset.title.clone(),
            byline: byline(&preset.author, &preset.date, &preset.model),
            rows,
            legend,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.rows.iter().filter(|row| row.proposed.is_some()).count()
    }
}

/// Localized strings printed on the card (columns and legend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLabels {
    pub human: String,
    pub ai: String,
    pub legend_human: String,
    pub legend_ai: String,
}

impl CardLabels {
    pub fn localized() -> Self {
        Self {
            human: t!("card-column-human"),
            ai: t!("card-column-ai"),
            legend_human: t!("card-legend-human"),
            legend_ai: t!("card-legend-ai"),
        }
    }

    pub fn legend(&self, entry: LegendEntry) -> &str {
        match entry {
            LegendEntry::Human => &self.legend_human,
            LegendEntry::AiProposed => &self.legend_ai,
        }
    }
}

#[component]
pub fn VibeCard(
    preset: Preset,
    show_both: bool,
    on_change: EventHandler<(DimensionId, u8)>,
) -> Element {
    // Re-render on language switches; the column and legend labels are localized.
    let _lang = try_use_context::<Signal<String>>().map(|code| code());
    let view = CardView::build(&preset, show_both);
    let labels = CardLabels::localized();

    rsx! {
        div { id: CARD_ELEMENT_ID, class: "vibe-card",
            div { class: "vibe-card__header",
                div { class: "vibe-card__eyebrow", "{CARD_EYEBROW}" }
                div { class: "vibe-card__title", "{view.title}" }
                div { class: "vibe-card__byline", "{view.byline}" }
            }

            div { class: "vibe-card__columns",
                span { class: "vibe-card__column vibe-card__column--human", "{labels.human}" }
                span { class: "vibe-card__column vibe-card__column--ai", "{labels.ai}" }
            }

            for row in view.rows.iter().cloned() {
                div { key: "{row.dimension}", class: "vibe-row",
                    div { class: "vibe-row__labels",
                        span { class: "vibe-row__figure vibe-row__figure--human",
                            "{format_percent(row.human_figure)}"
                        }
                        span { class: "vibe-row__label", "{row.icon} {row.label}" }
                        span { class: "vibe-row__figure vibe-row__figure--ai",
                            "{format_percent(row.ai_figure)}"
                        }
                    }
                    SliderTrack { row: row.clone(), on_change }
                }
            }

            if !view.legend.is_empty() {
                div { class: "vibe-card__legend",
                    for entry in view.legend.iter().copied() {
                        div { class: "vibe-legend",
                            span { class: entry.swatch_class() }
                            span { class: "vibe-legend__label", "{labels.legend(entry)}" }
                        }
                    }
                }
            }
        }
    }
}
