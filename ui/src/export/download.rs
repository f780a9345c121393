use futures::future::{FutureExt, LocalBoxFuture};

use super::{Downloader, ExportError};

/// Browser builds trigger a download; native builds write into the app data directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserOrDiskDownloader;

impl Downloader for BrowserOrDiskDownloader {
    fn save<'a>(
        &'a self,
        filename: &'a str,
        mime: &'a str,
        bytes: Vec<u8>,
    ) -> LocalBoxFuture<'a, Result<Option<String>, ExportError>> {
        download_bytes(filename, mime, bytes).boxed_local()
    }
}

/// Deliver `bytes` under `filename`. Returns the path written on native targets.
pub async fn download_bytes(
    filename: &str,
    mime: &str,
    bytes: Vec<u8>,
) -> Result<Option<String>, ExportError> {
    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

        let fail = |what: &str| ExportError::Download(what.to_string());

        let array = js_sys::Uint8Array::from(bytes.as_slice());
        let parts = js_sys::Array::new();
        parts.push(&array.buffer());

        let opts = BlobPropertyBag::new();
        opts.set_type(mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(|_| fail("failed to create blob"))?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| fail("unable to create object URL"))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| fail("document unavailable"))?;
        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|_| fail("unable to create anchor"))?
            .dyn_into()
            .map_err(|_| fail("anchor cast failed"))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or_else(|| fail("missing body"))?
            .append_child(&anchor)
            .ok();
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();

        Ok(None)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = mime;
        let dir = desktop_export_dir()?;
        let path = write_export(&dir, filename, &bytes)?;
        Ok(Some(path.to_string_lossy().to_string()))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn desktop_export_dir() -> Result<std::path::PathBuf, ExportError> {
    let dirs = directories::ProjectDirs::from("com", "VibeCard", "VibeCard")
        .ok_or_else(|| ExportError::Download("unable to determine export directory".into()))?;
    Ok(dirs.data_dir().join("exports"))
}

#[cfg(not(target_arch = "wasm32"))]
fn write_export(
    dir: &std::path::Path,
    filename: &str,
    bytes: &[u8],
) -> Result<std::path::PathBuf, ExportError> {
    use std::fs;

    let io = |err: std::io::Error| ExportError::Download(err.to_string());
    fs::create_dir_all(dir).map_err(io)?;
    let path = dir.join(filename);
    fs::write(&path, bytes).map_err(io)?;
    Ok(path)
}
