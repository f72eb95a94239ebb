//! Tile identifiers and covering-tile records

use std::fmt;

use serde::{Deserialize, Serialize};

/// Quadtree tile address: zoom level plus column/row at that level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    pub fn new(z: u8, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// The root tile covering the whole world
    pub fn root() -> Self {
        Self::new(0, 0, 0)
    }

    /// Number of tiles along one axis at this zoom
    pub fn tiles_per_axis(&self) -> u64 {
        1u64 << self.z
    }

    /// Whether `x` and `y` lie inside the `2^z` grid
    pub fn is_valid(&self) -> bool {
        (self.x as u64) < self.tiles_per_axis() && (self.y as u64) < self.tiles_per_axis()
    }

    /// `"z-x-y"` key handed to the rendering pipeline
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn parent(&self) -> Option<TileId> {
        if self.z == 0 {
            return None;
        }
        Some(Self::new(self.z - 1, self.x >> 1, self.y >> 1))
    }

    /// Children in quadrant order: 0 = (low x, low y), 1 = (high x, low y),
    /// 2 = (low x, high y), 3 = (high x, high y)
    pub fn children(&self) -> [TileId; 4] {
        std::array::from_fn(|i| {
            let i = i as u32;
            Self::new(self.z + 1, (self.x << 1) + (i % 2), (self.y << 1) + (i >> 1))
        })
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.z, self.x, self.y)
    }
}

/// A tile accepted for drawing this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoveringTile {
    pub id: TileId,
    /// World copy the tile belongs to (0 = primary)
    pub wrap: i32,
    /// Planar distance from the tile center to the view center, in
    /// world-discrete units; ordering only
    pub distance: f64,
}
