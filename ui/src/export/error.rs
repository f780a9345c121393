//! Error types for the export pipeline.

use thiserror::Error;

/// Failure to obtain the rasterization capability.
///
/// `Clone` so a single load outcome can be handed to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The capability could not be fetched or initialised.
    #[error("rasterizer failed to load: {0}")]
    Script(String),

    /// Loading finished but the expected entry point is not there.
    #[error("rasterizer entry point `{0}` missing after load")]
    Missing(String),

    /// The load was dropped before it settled.
    #[error("rasterizer load abandoned before it settled")]
    Abandoned,
}

/// Failure of one export attempt. No file is produced for any of these.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid export options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("rasterization failed: {0}")]
    Rasterize(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("download failed: {0}")]
    Download(String),
}
