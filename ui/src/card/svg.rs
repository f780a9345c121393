//! SVG rendition of the card, used where there is no DOM to capture (native export).
//!
//! Geometry mirrors the stylesheet: 480 px wide card, 28 px side padding, one 28 px
//! track per row. Everything outside the rounded card stays transparent.

use std::fmt::Write as _;

use super::{CardLabels, CardView, LegendEntry, CARD_EYEBROW};
use crate::core::format::format_percent;

pub const CARD_WIDTH: f64 = 480.0;
const PAD_X: f64 = 28.0;
const PAD_TOP: f64 = 24.0;
const PAD_BOTTOM: f64 = 20.0;
const RADIUS: f64 = 16.0;
const HEADER_HEIGHT: f64 = 78.0;
const COLUMNS_HEIGHT: f64 = 30.0;
const LABEL_HEIGHT: f64 = 18.0;
const TRACK_HEIGHT: f64 = 28.0;
const ROW_GAP: f64 = 11.0;
const LEGEND_HEIGHT: f64 = 40.0;

const SANS: &str = "DM Sans, Helvetica Neue, Arial, sans-serif";
const SERIF: &str = "Source Serif 4, Georgia, serif";
const MONO: &str = "DejaVu Sans Mono, Courier New, monospace";

mod palette {
    pub const CARD_FROM: &str = "#1c1917";
    pub const CARD_TO: &str = "#292524";
    pub const BORDER: &str = "rgba(214,198,172,0.13)";
    pub const TITLE: &str = "#faf6f0";
    pub const SUBTITLE: &str = "rgba(214,198,172,0.55)";
    pub const DIM_LABEL: &str = "rgba(214,198,172,0.72)";
    pub const HUMAN: &str = "#6d8cc7";
    pub const HUMAN_BRIGHT: &str = "#8aa4d6";
    pub const AI: &str = "#d4836b";
    pub const ACCENT: &str = "#c9a96e";
}

/// Total card height for a view.
pub fn card_height(view: &CardView) -> f64 {
    let rows = view.rows.len() as f64;
    let legend = if view.legend.is_empty() {
        0.0
    } else {
        LEGEND_HEIGHT
    };
    PAD_TOP
        + HEADER_HEIGHT
        + COLUMNS_HEIGHT
        + rows * (LABEL_HEIGHT + TRACK_HEIGHT + ROW_GAP)
        + legend
        + PAD_BOTTOM
}

/// Escape text for use in SVG content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

pub fn render(view: &CardView, labels: &CardLabels) -> String {
    let width = CARD_WIDTH;
    let height = card_height(view);
    let inner = width - 2.0 * PAD_X;
    let mut svg = String::new();

    let _ = write!(
        svg,
        "<svg xmlns='http://www.w3.org/2000/svg' width='{width}' height='{height}' viewBox='0 0 {width} {height}'>\
<defs><linearGradient id='card-bg' x1='0.2' y1='0' x2='0.8' y2='1'>\
<stop offset='0%' stop-color='{}'/><stop offset='100%' stop-color='{}'/></linearGradient>\
<linearGradient id='human-fill' x1='0' y1='0' x2='1' y2='0'>\
<stop offset='0%' stop-color='{}'/><stop offset='100%' stop-color='{}'/></linearGradient></defs>",
        palette::CARD_FROM,
        palette::CARD_TO,
        palette::HUMAN,
        palette::HUMAN_BRIGHT,
    );
    let _ = write!(
        svg,
        "<rect x='0.5' y='0.5' width='{}' height='{}' rx='{RADIUS}' fill='url(#card-bg)' stroke='{}'/>",
        width - 1.0,
        height - 1.0,
        palette::BORDER,
    );

    // Header
    let mut y = PAD_TOP;
    let _ = write!(
        svg,
        "<text x='{PAD_X}' y='{}' font-family='{SANS}' font-size='9' font-weight='700' letter-spacing='3' fill='{}'>{}</text>",
        y + 9.0,
        palette::ACCENT,
        escape(&CARD_EYEBROW.to_uppercase()),
    );
    let _ = write!(
        svg,
        "<text x='{PAD_X}' y='{}' font-family='{SERIF}' font-size='17' font-weight='600' fill='{}'>{}</text>",
        y + 34.0,
        palette::TITLE,
        escape(&view.title),
    );
    let _ = write!(
        svg,
        "<text x='{PAD_X}' y='{}' font-family='{SANS}' font-size='11.5' fill='{}'>{}</text>",
        y + 54.0,
        palette::SUBTITLE,
        escape(&view.byline),
    );
    y += HEADER_HEIGHT;
    let _ = write!(
        svg,
        "<line x1='{PAD_X}' y1='{}' x2='{}' y2='{}' stroke='{}'/>",
        y - 10.0,
        width - PAD_X,
        y - 10.0,
        palette::BORDER,
    );

    // Column headings
    let _ = write!(
        svg,
        "<text x='{}' y='{}' font-family='{SANS}' font-size='17' font-weight='700' letter-spacing='1' fill='{}'>{}</text>",
        PAD_X + 2.0,
        y + 16.0,
        palette::HUMAN,
        escape(&labels.human.to_uppercase()),
    );
    let _ = write!(
        svg,
        "<text x='{}' y='{}' text-anchor='end' font-family='{SANS}' font-size='17' font-weight='700' letter-spacing='1' fill='{}'>{}</text>",
        width - PAD_X - 2.0,
        y + 16.0,
        palette::AI,
        escape(&labels.ai.to_uppercase()),
    );
    y += COLUMNS_HEIGHT;

    for row in &view.rows {
        let _ = write!(
            svg,
            "<text x='{PAD_X}' y='{}' font-family='{MONO}' font-size='11' font-weight='700' fill='{}'>{}</text>",
            y + 12.0,
            palette::HUMAN,
            format_percent(row.human_figure),
        );
        let _ = write!(
            svg,
            "<text x='{}' y='{}' text-anchor='middle' font-family='{SANS}' font-size='12' font-weight='500' fill='{}'>{} {}</text>",
            width / 2.0,
            y + 12.0,
            palette::DIM_LABEL,
            escape(row.icon),
            escape(row.label),
        );
        let _ = write!(
            svg,
            "<text x='{}' y='{}' text-anchor='end' font-family='{MONO}' font-size='11' font-weight='700' fill='{}'>{}</text>",
            width - PAD_X,
            y + 12.0,
            palette::AI,
            format_percent(row.ai_figure),
        );
        y += LABEL_HEIGHT;

        let bar_y = y + 10.0;
        let fill_width = inner * f64::from(row.fill) / 100.0;
        let handle_x = PAD_X + fill_width;
        let _ = write!(
            svg,
            "<rect x='{PAD_X}' y='{bar_y}' width='{inner}' height='8' rx='4' fill='{}' fill-opacity='0.28'/>",
            palette::AI,
        );
        if row.fill > 0 {
            let _ = write!(
                svg,
                "<rect x='{PAD_X}' y='{bar_y}' width='{fill_width}' height='8' rx='4' fill='url(#human-fill)' fill-opacity='0.65'/>",
            );
        }
        if let Some(proposed) = row.proposed {
            let marker_x = PAD_X + inner * f64::from(proposed) / 100.0;
            let _ = write!(
                svg,
                "<circle cx='{marker_x}' cy='{}' r='7.5' fill='{}' fill-opacity='0.5' stroke='rgba(28,25,23,0.8)' stroke-width='2'/>",
                y + 14.0,
                palette::AI,
            );
        }
        let _ = write!(
            svg,
            "<circle cx='{handle_x}' cy='{}' r='10.5' fill='{}' stroke='{}' stroke-width='2.5'/>",
            y + 14.0,
            palette::HUMAN_BRIGHT,
            palette::TITLE,
        );
        y += TRACK_HEIGHT + ROW_GAP;
    }

    if !view.legend.is_empty() {
        let _ = write!(
            svg,
            "<line x1='{PAD_X}' y1='{}' x2='{}' y2='{}' stroke='{}'/>",
            y + 2.0,
            width - PAD_X,
            y + 2.0,
            palette::BORDER,
        );
        let mut x = PAD_X;
        for entry in &view.legend {
            let (fill, opacity) = match entry {
                LegendEntry::Human => (palette::HUMAN, 1.0),
                LegendEntry::AiProposed => (palette::AI, 0.6),
            };
            let label = escape(labels.legend(*entry));
            let _ = write!(
                svg,
                "<circle cx='{}' cy='{}' r='5.5' fill='{fill}' fill-opacity='{opacity}' stroke='{}' stroke-width='1.5'/>\
<text x='{}' y='{}' font-family='{SANS}' font-size='10.5' fill='{}'>{label}</text>",
                x + 5.5,
                y + 22.0,
                palette::TITLE,
                x + 17.0,
                y + 26.0,
                palette::SUBTITLE,
            );
            x += 17.0 + 7.0 * label.chars().count() as f64 + 18.0;
        }
    }

    svg.push_str("</svg>");
    svg
}
