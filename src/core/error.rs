//! Error types for covering-tile selection

use thiserror::Error;

/// Main error type for the crate
///
/// The per-frame path never surfaces these to the caller as a failure:
/// `TileManager::covering_tiles` logs them and returns an empty tile list.
#[derive(Debug, Error)]
pub enum Error {
    #[error("zoom {zoom} is below the configured minimum {min_zoom}")]
    ZoomOutOfRange { zoom: f64, min_zoom: f64 },

    #[error("camera position is unavailable")]
    NoCameraPosition,

    #[error("cannot build frustum: {0}")]
    NoFrustum(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
