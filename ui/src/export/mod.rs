//! PNG export of the Vibe Card.
//!
//! An export acquires the rasterization capability (loaded at most once per process and
//! shared through [`LoadCache`]), rasterizes the card at 3x on a transparent background,
//! then hands the PNG to a [`Downloader`]. Only one export runs at a time; requests that
//! arrive while one is in flight are skipped.
//!
//! Browser builds capture the mounted `#vibe-card` element with html2canvas. Native builds
//! render the card's SVG rendition with resvg.

use std::cell::Cell;
use std::rc::Rc;

use base64::Engine as _;
use futures::future::{FutureExt, LocalBoxFuture};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::card::{CardLabels, CardView, CARD_ELEMENT_ID};

mod cache;
mod download;
mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use cache::{LoadCache, LoadPhase};
pub use download::{download_bytes, BrowserOrDiskDownloader};
pub use error::{ExportError, LoadError};

/// Every exported file name starts with this.
pub const FILENAME_PREFIX: &str = "vibe_card_";
pub const PNG_MIME: &str = "image/png";

/// Rasterization settings. Serialized as the option object html2canvas expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// `None` keeps the background transparent.
    pub background_color: Option<String>,
    pub scale: f64,
    #[serde(rename = "useCORS")]
    pub use_cors: bool,
    pub logging: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            background_color: None,
            scale: 3.0,
            use_cors: true,
            logging: false,
        }
    }
}

impl ExportOptions {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Lowercase the title and collapse every run of characters outside `[a-z0-9]` into one
/// underscore, dropping a leading or trailing underscore.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_gap = false;
    for ch in title.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
            in_gap = false;
        } else if !in_gap {
            slug.push('_');
            in_gap = true;
        }
    }
    let slug = slug.strip_prefix('_').unwrap_or(&slug);
    slug.strip_suffix('_').unwrap_or(slug).to_string()
}

/// `vibe_card_<slug>.png`
pub fn export_filename(title: &str) -> String {
    format!("{FILENAME_PREFIX}{}.png", slugify(title))
}

/// Decode a `data:image/png;base64,...` URL into raw bytes.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, ExportError> {
    let (_, payload) = data_url
        .split_once(";base64,")
        .ok_or_else(|| ExportError::Encode("canvas returned a non-base64 data URL".into()))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|err| ExportError::Encode(err.to_string()))
}

/// What gets rasterized: the mounted element (browser) or its rendition (native).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTarget {
    pub element_id: &'static str,
    pub card: CardView,
    pub labels: CardLabels,
}

impl RasterTarget {
    pub fn new(card: CardView, labels: CardLabels) -> Self {
        Self {
            element_id: CARD_ELEMENT_ID,
            card,
            labels,
        }
    }
}

pub trait Rasterizer {
    fn rasterize<'a>(
        &'a self,
        target: &'a RasterTarget,
        options: &'a ExportOptions,
    ) -> LocalBoxFuture<'a, Result<Vec<u8>, ExportError>>;
}

/// Produces the rasterization capability. Called at most once per successful load.
pub trait RasterLoader {
    type Output: Rasterizer + Clone + 'static;

    fn load(&self) -> LocalBoxFuture<'_, Result<Self::Output, LoadError>>;
}

pub trait Downloader {
    /// Deliver the bytes. Returns the saved path when there is one.
    fn save<'a>(
        &'a self,
        filename: &'a str,
        mime: &'a str,
        bytes: Vec<u8>,
    ) -> LocalBoxFuture<'a, Result<Option<String>, ExportError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Another export was already in flight.
    Skipped,
    Saved {
        filename: String,
        location: Option<String>,
    },
}

struct InFlight {
    flag: Rc<Cell<bool>>,
}

impl InFlight {
    fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag: flag.clone() })
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

pub struct Exporter<L: RasterLoader, D> {
    loader: L,
    downloader: D,
    cache: Rc<LoadCache<L::Output>>,
    in_flight: Rc<Cell<bool>>,
    options: ExportOptions,
}

impl<L, D> Exporter<L, D>
where
    L: RasterLoader,
    D: Downloader,
{
    pub fn new(
        loader: L,
        downloader: D,
        cache: Rc<LoadCache<L::Output>>,
        options: ExportOptions,
    ) -> Self {
        Self {
            loader,
            downloader,
            cache,
            in_flight: Rc::new(Cell::new(false)),
            options,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn cache(&self) -> &LoadCache<L::Output> {
        &self.cache
    }

    /// Export `target` as `vibe_card_<slug(title)>.png`.
    ///
    /// The busy flag is cleared on every exit path, including cancellation.
    pub async fn export(
        &self,
        target: &RasterTarget,
        title: &str,
    ) -> Result<ExportOutcome, ExportError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("export already in flight; request ignored");
            return Ok(ExportOutcome::Skipped);
        };

        let result = self.run(target, title).await;
        if let Err(err) = &result {
            error!(error = %err, "card export failed");
        }
        result
    }

    async fn run(&self, target: &RasterTarget, title: &str) -> Result<ExportOutcome, ExportError> {
        let rasterizer = self.cache.get_or_load(|| self.loader.load()).await?;
        let png = rasterizer.rasterize(target, &self.options).await?;

        let filename = export_filename(title);
        let location = self.downloader.save(&filename, PNG_MIME, png).await?;
        info!(%filename, ?location, "card exported");
        Ok(ExportOutcome::Saved { filename, location })
    }
}

#[cfg(target_arch = "wasm32")]
pub type PlatformLoader = web::Html2CanvasLoader;
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformLoader = native::SvgRasterLoader;

pub type PlatformExporter = Exporter<PlatformLoader, BrowserOrDiskDownloader>;

thread_local! {
    static SHARED_RASTERIZER: Rc<LoadCache<<PlatformLoader as RasterLoader>::Output>> =
        Rc::new(LoadCache::new());
}

/// Exporter for the current target. All exporters on a thread share one loaded rasterizer.
pub fn platform_exporter() -> PlatformExporter {
    Exporter::new(
        PlatformLoader::default(),
        BrowserOrDiskDownloader,
        SHARED_RASTERIZER.with(Rc::clone),
        ExportOptions::default(),
    )
}

/// Box a ready value as a local future. Shared by the synchronous backends.
#[cfg(any(test, not(target_arch = "wasm32")))]
pub(crate) fn ready<'a, T: 'a>(value: T) -> LocalBoxFuture<'a, T> {
    futures::future::ready(value).boxed_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Preset;
    use futures::executor::{block_on, LocalPool};
    use futures::task::LocalSpawnExt;
    use futures_channel::oneshot;
    use std::cell::RefCell;

    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

    #[derive(Clone)]
    struct FakeRaster {
        fail: bool,
    }

    impl Rasterizer for FakeRaster {
        fn rasterize<'a>(
            &'a self,
            _target: &'a RasterTarget,
            _options: &'a ExportOptions,
        ) -> LocalBoxFuture<'a, Result<Vec<u8>, ExportError>> {
            if self.fail {
                ready(Err(ExportError::Rasterize("canvas tainted".into())))
            } else {
                ready(Ok(PNG_MAGIC.to_vec()))
            }
        }
    }

    #[derive(Default)]
    struct FakeLoader {
        loads: Rc<Cell<u32>>,
        failures_left: Cell<u32>,
        raster_fails: bool,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    impl RasterLoader for FakeLoader {
        type Output = FakeRaster;

        fn load(&self) -> LocalBoxFuture<'_, Result<FakeRaster, LoadError>> {
            self.loads.set(self.loads.get() + 1);
            let fail = self.failures_left.get() > 0;
            if fail {
                self.failures_left.set(self.failures_left.get() - 1);
            }
            let gate = self.gate.borrow_mut().take();
            let raster_fails = self.raster_fails;
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                if fail {
                    Err(LoadError::Script("network unreachable".into()))
                } else {
                    Ok(FakeRaster { fail: raster_fails })
                }
            }
            .boxed_local()
        }
    }

    #[derive(Clone, Default)]
    struct FakeDownloads {
        saved: Rc<RefCell<Vec<String>>>,
    }

    impl Downloader for FakeDownloads {
        fn save<'a>(
            &'a self,
            filename: &'a str,
            mime: &'a str,
            bytes: Vec<u8>,
        ) -> LocalBoxFuture<'a, Result<Option<String>, ExportError>> {
            assert_eq!(mime, PNG_MIME);
            assert_eq!(&bytes[..4], &PNG_MAGIC);
            self.saved.borrow_mut().push(filename.to_string());
            ready(Ok(None))
        }
    }

    fn target() -> RasterTarget {
        RasterTarget::new(
            CardView::build(&Preset::example(), true),
            CardLabels {
                human: "Human".into(),
                ai: "AI".into(),
                legend_human: "Human assessment".into(),
                legend_ai: "AI proposed".into(),
            },
        )
    }

    fn exporter(loader: FakeLoader, downloads: &FakeDownloads) -> Exporter<FakeLoader, FakeDownloads> {
        Exporter::new(
            loader,
            downloads.clone(),
            Rc::new(LoadCache::new()),
            ExportOptions::default(),
        )
    }

    #[test]
    fn filename_is_slugged_title() {
        assert_eq!(export_filename("My Custom Project"), "vibe_card_my_custom_project.png");
        assert_eq!(export_filename("My Work Product!!"), "vibe_card_my_work_product.png");
        assert_eq!(
            export_filename("Building a Spaced Repetition System"),
            "vibe_card_building_a_spaced_repetition_system.png"
        );
        assert_eq!(export_filename("  -- Draft #2 --  "), "vibe_card_draft_2.png");
        assert_eq!(export_filename("Über Café"), "vibe_card_ber_caf.png");
        assert_eq!(export_filename("!!!"), "vibe_card_.png");
        assert_eq!(export_filename(""), "vibe_card_.png");
    }

    #[test]
    fn options_serialize_for_html2canvas() {
        let json: serde_json::Value =
            serde_json::from_str(&ExportOptions::default().to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "backgroundColor": null,
                "scale": 3.0,
                "useCORS": true,
                "logging": false,
            })
        );
    }

    #[test]
    fn data_url_decodes_payload() {
        let bytes = decode_data_url("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(bytes, PNG_MAGIC.to_vec());
        assert!(matches!(
            decode_data_url("data:,"),
            Err(ExportError::Encode(_))
        ));
    }

    #[test]
    fn sequential_exports_reuse_loaded_rasterizer() {
        let downloads = FakeDownloads::default();
        let loader = FakeLoader::default();
        let loads = loader.loads.clone();
        let exporter = exporter(loader, &downloads);

        for _ in 0..3 {
            let outcome = block_on(exporter.export(&target(), "Spaced Repetition")).unwrap();
            assert_eq!(
                outcome,
                ExportOutcome::Saved {
                    filename: "vibe_card_spaced_repetition.png".into(),
                    location: None,
                }
            );
        }
        assert_eq!(loads.get(), 1);
        assert_eq!(downloads.saved.borrow().len(), 3);
        assert!(!exporter.is_busy());
    }

    #[test]
    fn overlapping_requests_produce_one_download() {
        let (gate_tx, gate_rx) = oneshot::channel();
        let downloads = FakeDownloads::default();
        let loader = FakeLoader {
            gate: RefCell::new(Some(gate_rx)),
            ..FakeLoader::default()
        };
        let loads = loader.loads.clone();
        let exporter = Rc::new(exporter(loader, &downloads));
        let outcomes = Rc::new(RefCell::new(Vec::new()));

        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        for _ in 0..2 {
            let exporter = exporter.clone();
            let outcomes = outcomes.clone();
            spawner
                .spawn_local(async move {
                    let outcome = exporter.export(&target(), "Twice").await;
                    outcomes.borrow_mut().push(outcome.unwrap());
                })
                .unwrap();
        }

        pool.run_until_stalled();
        assert!(exporter.is_busy());
        assert_eq!(*outcomes.borrow(), vec![ExportOutcome::Skipped]);

        gate_tx.send(()).unwrap();
        pool.run_until_stalled();

        assert_eq!(loads.get(), 1);
        assert_eq!(*downloads.saved.borrow(), vec!["vibe_card_twice.png".to_string()]);
        assert!(!exporter.is_busy());
    }

    #[test]
    fn failed_load_clears_busy_and_retries_fresh() {
        let downloads = FakeDownloads::default();
        let loader = FakeLoader {
            failures_left: Cell::new(1),
            ..FakeLoader::default()
        };
        let loads = loader.loads.clone();
        let exporter = exporter(loader, &downloads);

        let first = block_on(exporter.export(&target(), "Retry"));
        assert!(matches!(first, Err(ExportError::Load(LoadError::Script(_)))));
        assert!(!exporter.is_busy());
        assert!(downloads.saved.borrow().is_empty());
        assert!(matches!(exporter.cache().phase(), LoadPhase::Failed(_)));

        let second = block_on(exporter.export(&target(), "Retry")).unwrap();
        assert!(matches!(second, ExportOutcome::Saved { .. }));
        assert_eq!(loads.get(), 2);
        assert_eq!(downloads.saved.borrow().len(), 1);
    }

    #[test]
    fn rasterize_failure_downloads_nothing() {
        let downloads = FakeDownloads::default();
        let loader = FakeLoader {
            raster_fails: true,
            ..FakeLoader::default()
        };
        let exporter = exporter(loader, &downloads);

        let result = block_on(exporter.export(&target(), "Broken"));
        assert!(matches!(result, Err(ExportError::Rasterize(_))));
        assert!(downloads.saved.borrow().is_empty());
        assert!(!exporter.is_busy());
    }

    #[test]
    fn cancelled_export_releases_busy_flag() {
        let (_gate_tx, gate_rx) = oneshot::channel();
        let downloads = FakeDownloads::default();
        let loader = FakeLoader {
            gate: RefCell::new(Some(gate_rx)),
            ..FakeLoader::default()
        };
        let exporter = Rc::new(exporter(loader, &downloads));

        let mut pool = LocalPool::new();
        let handle = {
            let exporter = exporter.clone();
            pool.spawner()
                .spawn_local_with_handle(async move { exporter.export(&target(), "Gone").await.is_ok() })
                .unwrap()
        };
        pool.run_until_stalled();
        assert!(exporter.is_busy());

        drop(handle);
        pool.run_until_stalled();
        assert!(!exporter.is_busy());
        assert_eq!(exporter.cache().phase(), LoadPhase::Unstarted);
    }
}
