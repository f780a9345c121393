//! resvg-backed rasterizer for native builds.
//!
//! Loading the capability means indexing the system fonts once; the database is shared
//! by every later export.

use std::sync::Arc;

use futures::future::{FutureExt, LocalBoxFuture};
use tiny_skia::{Color, Pixmap, Transform};
use tracing::{info, warn};
use usvg::fontdb;

use super::{ready, ExportError, ExportOptions, LoadError, RasterLoader, RasterTarget, Rasterizer};
use crate::card::svg;

pub use fontdb::Database as FontDatabase;

#[derive(Clone)]
pub struct SvgRasterizer {
    fonts: Arc<fontdb::Database>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRasterLoader;

impl RasterLoader for SvgRasterLoader {
    type Output = SvgRasterizer;

    fn load(&self) -> LocalBoxFuture<'_, Result<SvgRasterizer, LoadError>> {
        async {
            let mut fonts = fontdb::Database::new();
            fonts.load_system_fonts();
            if fonts.len() == 0 {
                warn!("no system fonts found; exported card text will be blank");
            }
            info!(faces = fonts.len(), "card renderer ready");
            Ok(SvgRasterizer::with_fonts(Arc::new(fonts)))
        }
        .boxed_local()
    }
}

impl SvgRasterizer {
    pub fn with_fonts(fonts: Arc<fontdb::Database>) -> Self {
        Self { fonts }
    }

    pub fn render_pixmap(
        &self,
        target: &RasterTarget,
        options: &ExportOptions,
    ) -> Result<Pixmap, ExportError> {
        let markup = svg::render(&target.card, &target.labels);
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(&self.fonts);
        let tree = usvg::Tree::from_str(&markup, &opt)
            .map_err(|err| ExportError::Rasterize(err.to_string()))?;

        let scale = options.scale as f32;
        let size = tree.size();
        let width = (size.width() * scale).ceil() as u32;
        let height = (size.height() * scale).ceil() as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Rasterize(format!("invalid canvas size {width}x{height}"))
        })?;

        if let Some(color) = options.background_color.as_deref() {
            let color = parse_hex_color(color)
                .ok_or_else(|| ExportError::Rasterize(format!("unsupported background {color}")))?;
            pixmap.fill(color);
        }
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());
        Ok(pixmap)
    }
}

impl Rasterizer for SvgRasterizer {
    fn rasterize<'a>(
        &'a self,
        target: &'a RasterTarget,
        options: &'a ExportOptions,
    ) -> LocalBoxFuture<'a, Result<Vec<u8>, ExportError>> {
        let png = self.render_pixmap(target, options).and_then(|pixmap| {
            pixmap
                .encode_png()
                .map_err(|err| ExportError::Encode(err.to_string()))
        });
        ready(png)
    }
}

/// `#rrggbb` only.
fn parse_hex_color(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(hex.get(at..at + 2)?, 16).ok();
    Some(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, 255))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{svg::CARD_WIDTH, CardLabels, CardView};
    use crate::core::model::Preset;

    fn target(show_both: bool) -> RasterTarget {
        RasterTarget::new(
            CardView::build(&Preset::custom(), show_both),
            CardLabels {
                human: "Human".into(),
                ai: "AI".into(),
                legend_human: "Human assessment".into(),
                legend_ai: "AI proposed".into(),
            },
        )
    }

    fn rasterizer() -> SvgRasterizer {
        SvgRasterizer::with_fonts(Arc::new(fontdb::Database::new()))
    }

    #[test]
    fn renders_at_three_times_with_transparent_corners() {
        let target = target(false);
        let pixmap = rasterizer()
            .render_pixmap(&target, &ExportOptions::default())
            .unwrap();

        assert_eq!(pixmap.width(), (CARD_WIDTH * 3.0) as u32);
        assert_eq!(
            pixmap.height(),
            (svg::card_height(&target.card) * 3.0).ceil() as u32
        );
        assert_eq!(pixmap.pixel(0, 0).unwrap().alpha(), 0);
        let center = pixmap.pixel(pixmap.width() / 2, 60).unwrap();
        assert_eq!(center.alpha(), 255);
    }

    #[test]
    fn encodes_png() {
        let bytes = futures::executor::block_on(
            rasterizer().rasterize(&target(true), &ExportOptions::default()),
        )
        .unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn background_color_fills_corners() {
        let options = ExportOptions {
            background_color: Some("#ffffff".into()),
            ..ExportOptions::default()
        };
        let pixmap = rasterizer().render_pixmap(&target(false), &options).unwrap();
        assert_eq!(pixmap.pixel(0, 0).unwrap().alpha(), 255);

        let bad = ExportOptions {
            background_color: Some("white".into()),
            ..ExportOptions::default()
        };
        assert!(rasterizer().render_pixmap(&target(false), &bad).is_err());
    }

    #[test]
    fn hex_colors() {
        assert!(parse_hex_color("#1c1917").is_some());
        assert!(parse_hex_color("1c1917").is_none());
        assert!(parse_hex_color("#fff").is_none());
        assert!(parse_hex_color("#zzzzzz").is_none());
    }
}
