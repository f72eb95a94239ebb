//! Tile manager configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::Result;

/// Finest zoom level tiles are sampled at
pub const MAX_TILE_ZOOM: u8 = 24;

/// How eagerly nodes split as the camera approaches.
///
/// The split threshold of a node at level `z` is `2^(max_tile_zoom - z + k)`
/// grid units of view depth, with `k` = -1, 0, +1 for lazy, default, hurry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Half the default distance: fewer, coarser tiles
    Lazy,
    #[default]
    Default,
    /// Twice the default distance: more, finer tiles
    Hurry,
}

impl SplitMode {
    /// View depth below which a node at `z` must split
    pub fn threshold(self, max_tile_zoom: u8, z: u8) -> f64 {
        let bias = match self {
            SplitMode::Lazy => -1,
            SplitMode::Default => 0,
            SplitMode::Hurry => 1,
        };
        2f64.powi(max_tile_zoom as i32 - z as i32 + bias)
    }
}

/// Recognized options, all defaulted
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TileManagerConfig {
    /// Below this map zoom nothing is drawn; coarser leaves are dropped
    pub min_zoom: f64,
    /// Sampling zoom is clamped to this
    pub max_zoom: f64,
    /// Volumetric tiles with altitude instead of flat footprints
    pub elevation_mode: bool,
    /// Also cover the repeated copies of the world east and west
    pub render_world_copies: bool,
    pub split_mode: SplitMode,
}

impl Default for TileManagerConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.0,
            max_zoom: MAX_TILE_ZOOM as f64,
            elevation_mode: false,
            render_world_copies: false,
            split_mode: SplitMode::Default,
        }
    }
}

impl TileManagerConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        let range = 0.0..=MAX_TILE_ZOOM as f64;
        if !range.contains(&self.min_zoom) {
            return Err(Error::Config(format!("minZoom {} outside [0, {MAX_TILE_ZOOM}]", self.min_zoom)));
        }
        if !range.contains(&self.max_zoom) {
            return Err(Error::Config(format!("maxZoom {} outside [0, {MAX_TILE_ZOOM}]", self.max_zoom)));
        }
        if self.min_zoom > self.max_zoom {
            return Err(Error::Config(format!(
                "minZoom {} is greater than maxZoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        Ok(())
    }
}
