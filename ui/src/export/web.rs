//! html2canvas-backed rasterizer for browser builds.
//!
//! The library is injected as a `<script>` on first use. A page that already exposes
//! `window.html2canvas` is used as is.

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use futures_channel::oneshot;
use gloo_events::EventListener;
use tracing::{debug, info};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, HtmlScriptElement, Window};

use super::{
    decode_data_url, ExportError, ExportOptions, LoadError, RasterLoader, RasterTarget, Rasterizer,
    PNG_MIME,
};

pub const HTML2CANVAS_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/html2canvas/1.4.1/html2canvas.min.js";
const GLOBAL_NAME: &str = "html2canvas";

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Handle to the loaded `html2canvas` function.
#[derive(Clone)]
pub struct Html2Canvas {
    entry: js_sys::Function,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Html2CanvasLoader;

impl RasterLoader for Html2CanvasLoader {
    type Output = Html2Canvas;

    fn load(&self) -> LocalBoxFuture<'_, Result<Html2Canvas, LoadError>> {
        load_script().boxed_local()
    }
}

fn lookup(window: &Window) -> Option<Html2Canvas> {
    let value = js_sys::Reflect::get(window, &JsValue::from_str(GLOBAL_NAME)).ok()?;
    value
        .dyn_into::<js_sys::Function>()
        .ok()
        .map(|entry| Html2Canvas { entry })
}

type ScriptSignal = Rc<RefCell<Option<oneshot::Sender<Result<(), String>>>>>;

/// First of `load` / `error` wins.
fn settle(tx: &ScriptSignal, outcome: Result<(), String>) {
    if let Some(tx) = tx.borrow_mut().take() {
        let _ = tx.send(outcome);
    }
}

async fn load_script() -> Result<Html2Canvas, LoadError> {
    let window = web_sys::window().ok_or_else(|| LoadError::Script("window unavailable".into()))?;
    if let Some(found) = lookup(&window) {
        debug!("html2canvas already present on the page");
        return Ok(found);
    }

    let document = window
        .document()
        .ok_or_else(|| LoadError::Script("document unavailable".into()))?;
    let head = document
        .head()
        .ok_or_else(|| LoadError::Script("document has no <head>".into()))?;
    let script: HtmlScriptElement = document
        .create_element("script")
        .map_err(|err| LoadError::Script(describe(&err)))?
        .dyn_into()
        .map_err(|_| LoadError::Script("script cast failed".into()))?;
    script.set_src(HTML2CANVAS_URL);
    script.set_async(true);

    let (tx, rx) = oneshot::channel();
    let tx: ScriptSignal = Rc::new(RefCell::new(Some(tx)));
    let on_load = {
        let tx = tx.clone();
        EventListener::once(&script, "load", move |_| settle(&tx, Ok(())))
    };
    let on_error = {
        let tx = tx.clone();
        EventListener::once(&script, "error", move |_| {
            settle(&tx, Err(format!("could not fetch {HTML2CANVAS_URL}")))
        })
    };

    head.append_child(&script)
        .map_err(|err| LoadError::Script(describe(&err)))?;
    info!(url = HTML2CANVAS_URL, "loading html2canvas");

    let outcome = rx
        .await
        .unwrap_or_else(|_| Err("script listeners dropped".into()));
    drop(on_load);
    drop(on_error);

    if let Err(reason) = outcome {
        // A later attempt injects a fresh tag.
        script.remove();
        return Err(LoadError::Script(reason));
    }
    lookup(&window).ok_or_else(|| LoadError::Missing(GLOBAL_NAME.into()))
}

impl Rasterizer for Html2Canvas {
    fn rasterize<'a>(
        &'a self,
        target: &'a RasterTarget,
        options: &'a ExportOptions,
    ) -> LocalBoxFuture<'a, Result<Vec<u8>, ExportError>> {
        async move {
            let fail = |err: JsValue| ExportError::Rasterize(describe(&err));

            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| ExportError::Rasterize("document unavailable".into()))?;
            let element = document.get_element_by_id(target.element_id).ok_or_else(|| {
                ExportError::Rasterize(format!("#{} is not mounted", target.element_id))
            })?;
            let js_options = js_sys::JSON::parse(&options.to_json()?).map_err(fail)?;

            let promise: js_sys::Promise = self
                .entry
                .call2(&JsValue::NULL, &element, &js_options)
                .map_err(fail)?
                .dyn_into()
                .map_err(|_| ExportError::Rasterize("html2canvas did not return a promise".into()))?;
            let canvas: HtmlCanvasElement = JsFuture::from(promise)
                .await
                .map_err(fail)?
                .dyn_into()
                .map_err(|_| ExportError::Rasterize("html2canvas did not return a canvas".into()))?;

            let data_url = canvas.to_data_url_with_type(PNG_MIME).map_err(fail)?;
            decode_data_url(&data_url)
        }
        .boxed_local()
    }
}
