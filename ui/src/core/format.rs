//! Formatting helpers for presenting card values.

pub fn format_percent(value: u8) -> String {
    format!("{value}%")
}

/// Header byline: `author · date · model`, verbatim.
pub fn byline(author: &str, date: &str, model: &str) -> String {
    format!("{author} · {date} · {model}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byline_keeps_fields_verbatim() {
        assert_eq!(
            byline("  Ada ", "2026", "<model>"),
            "  Ada  · 2026 · <model>"
        );
    }
}
