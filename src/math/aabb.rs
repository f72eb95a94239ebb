//! Axis-aligned bounding box

use crate::core::types::DVec3;
use super::frustum::{Frustum, Intersection};

/// Axis-aligned bounding box defined by min and max corners.
///
/// In tile space x/y are world-discrete grid units and z is altitude.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Bounding box of tile `(z, x, y)` in copy `wrap` of a world that is
    /// `world_size` units wide, extruded over `[min_altitude, max_altitude]`.
    pub fn for_tile(
        world_size: f64,
        z: u8,
        x: u32,
        y: u32,
        wrap: i32,
        min_altitude: f64,
        max_altitude: f64,
    ) -> Self {
        let tiles = (1u64 << z) as f64;
        let tile_size = world_size / tiles;
        let x0 = (x as f64 + wrap as f64 * tiles) * tile_size;
        let y0 = y as f64 * tile_size;
        Self {
            min: DVec3::new(x0, y0, min_altitude),
            max: DVec3::new(x0 + tile_size, y0 + tile_size, max_altitude),
        }
    }

    /// Get center point
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Check if point is inside AABB
    pub fn contains_point(&self, p: DVec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Check if two AABBs overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_xy(other) &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Overlap test ignoring the altitude axis
    pub fn overlaps_xy(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    /// Expand AABB to include point
    pub fn expand(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Child quadrant for quadtree subdivision.
    ///
    /// Halves x and y and keeps the full altitude range. `index` bit 0 selects
    /// the high-x half, bit 1 the high-y half:
    ///
    /// ```text
    /// +---+---+
    /// | 0 | 1 |
    /// +---+---+
    /// | 2 | 3 |
    /// +---+---+
    /// ```
    pub fn quadrant(&self, index: usize) -> Aabb {
        debug_assert!(index < 4);
        let split = self.center();
        let mut min = self.min;
        let mut max = self.max;

        if index & 1 == 0 {
            max.x = split.x;
        } else {
            min.x = split.x;
        }
        if index & 2 == 0 {
            max.y = split.y;
        } else {
            min.y = split.y;
        }

        Aabb { min, max }
    }

    /// Point of the box nearest to `p` (`p` itself if it is inside)
    pub fn closest_point(&self, p: DVec3) -> DVec3 {
        p.clamp(self.min, self.max)
    }

    /// Classify the box against `frustum` as if it were flat on the ground
    /// plane: altitude is ignored and the footprint is tested at `z = 0`.
    pub fn intersects_flat(&self, frustum: &Frustum) -> Intersection {
        if !self.overlaps_xy(&frustum.bounds) {
            return Intersection::Outside;
        }

        let corners = [
            DVec3::new(self.min.x, self.min.y, 0.0),
            DVec3::new(self.max.x, self.min.y, 0.0),
            DVec3::new(self.max.x, self.max.y, 0.0),
            DVec3::new(self.min.x, self.max.y, 0.0),
        ];
        frustum.classify_points(&corners)
    }

    /// Classify the full 3D box against `frustum`
    pub fn intersects(&self, frustum: &Frustum) -> Intersection {
        if !self.overlaps(&frustum.bounds) {
            return Intersection::Outside;
        }

        let corners = [
            DVec3::new(self.min.x, self.min.y, self.min.z),
            DVec3::new(self.max.x, self.min.y, self.min.z),
            DVec3::new(self.max.x, self.max.y, self.min.z),
            DVec3::new(self.min.x, self.max.y, self.min.z),
            DVec3::new(self.min.x, self.min.y, self.max.z),
            DVec3::new(self.max.x, self.min.y, self.max.z),
            DVec3::new(self.max.x, self.max.y, self.max.z),
            DVec3::new(self.min.x, self.max.y, self.max.z),
        ];
        frustum.classify_points(&corners)
    }
}
