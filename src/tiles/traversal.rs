//! Quadtree traversal: frustum classification plus distance-based LOD.
//!
//! Nodes are plain values. Each one is popped from an explicit stack exactly
//! once, classified against the frustum unless an ancestor was already fully
//! inside, and then either accepted as a leaf or replaced by its four
//! quadrants. The split decision is computed inline, once per node.

use log::trace;

use crate::core::types::DVec3;
use crate::geo::GridSpace;
use crate::math::{Aabb, Frustum, Intersection};
use super::config::SplitMode;
use super::tile_id::{CoveringTile, TileId};

/// Copies of the world seeded on each side when world copies are rendered
pub const NUM_WORLD_COPIES: i32 = 3;

/// Altitude extrusion of tiles in elevation mode, in meters (below the
/// earth radius)
pub const MAX_ELEVATION: f64 = 6_000_000.0;

/// Zoom of the root tile
pub const ROOT_TILE_ZOOM: u8 = 0;

/// Candidate tile during traversal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadTileNode {
    pub wrap: i32,
    pub x: u32,
    pub y: u32,
    pub z: u8,
    /// Bounds in world-discrete space; z spans the altitude extrusion
    pub aabb: Aabb,
    /// An ancestor was fully inside the frustum, so this node is too
    pub fully_visible: bool,
}

impl QuadTileNode {
    /// Root of world copy `wrap` on a grid `world_size` units wide
    pub fn root(wrap: i32, world_size: f64, min_altitude: f64, max_altitude: f64) -> Self {
        Self {
            wrap,
            x: 0,
            y: 0,
            z: ROOT_TILE_ZOOM,
            aabb: Aabb::for_tile(world_size, ROOT_TILE_ZOOM, 0, 0, wrap, min_altitude, max_altitude),
            fully_visible: false,
        }
    }

    pub fn id(&self) -> TileId {
        TileId::new(self.z, self.x, self.y)
    }

    pub fn min_altitude(&self) -> f64 {
        self.aabb.min.z
    }

    pub fn max_altitude(&self) -> f64 {
        self.aabb.max.z
    }

    /// The four quadrants, in [`Aabb::quadrant`] order
    pub fn children(&self, fully_visible: bool) -> [QuadTileNode; 4] {
        let ids = self.id().children();
        std::array::from_fn(|i| QuadTileNode {
            wrap: self.wrap,
            x: ids[i].x,
            y: ids[i].y,
            z: ids[i].z,
            aabb: self.aabb.quadrant(i),
            fully_visible,
        })
    }
}

/// Counters for one traversal
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes popped from the stack
    pub visited: u32,
    /// Frustum classifications performed
    pub intersection_tests: u32,
    /// Subtrees discarded as outside
    pub culled: u32,
    /// Leaves collected
    pub accepted: u32,
    /// Leaves dropped for being coarser than the minimum zoom
    pub below_min_zoom: u32,
    /// Nodes replaced by their children
    pub splits: u32,
}

/// Per-frame inputs, already converted to world-discrete space
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub grid: GridSpace,
    /// Nodes coarser than this always split
    pub root_zoom: u8,
    /// Leaves coarser than this are dropped
    pub min_zoom: f64,
    /// View center; x/y in grid units, z is the center altitude in meters
    pub center: DVec3,
    /// Camera; x/y in grid units, z is altitude in meters
    pub camera: DVec3,
    /// Camera altitude above the center, in grid units
    pub camera_height: f64,
    /// Unit view direction
    pub forward: DVec3,
    pub elevation_mode: bool,
    pub split_mode: SplitMode,
}

impl FrameContext {
    pub fn max_tile_zoom(&self) -> u8 {
        self.grid.max_tile_zoom
    }

    /// Whether `node` needs finer children near the camera
    pub fn should_split(&self, node: &QuadTileNode) -> bool {
        if node.z < self.root_zoom {
            return true;
        }
        if node.z >= self.max_tile_zoom() {
            return false;
        }

        let closest = node.aabb.closest_point(self.center);
        let mut to_closest = closest - self.camera;
        // Flat tiles sit on the center's plane, which is camera_height below
        to_closest.z = if self.elevation_mode {
            to_closest.z * self.grid.meter_to_grid()
        } else {
            -self.camera_height
        };

        let depth = to_closest.dot(self.forward);
        if depth < self.split_mode.threshold(self.max_tile_zoom(), node.z) {
            return true;
        }

        // Under steep tilt the center may fall outside the split distance;
        // the tile under the center still goes to full resolution.
        closest.x == self.center.x && closest.y == self.center.y
    }

    /// Planar distance from the tile center to the view center, in grid units
    pub fn tile_distance(&self, id: TileId, wrap: i32) -> f64 {
        let scale = (1u64 << (self.max_tile_zoom() - id.z)) as f64;
        let x = id.x as f64 + 0.5 + ((wrap as i64) << id.z) as f64;
        let y = id.y as f64 + 0.5;
        let dx = self.center.x - x * scale;
        let dy = self.center.y - y * scale;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Explicit-stack quadtree walk; the stack is reused across frames
#[derive(Debug, Default)]
pub struct QuadtreeTraversal {
    stack: Vec<QuadTileNode>,
}

impl QuadtreeTraversal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk from `roots`, appending accepted leaves to `out` in collection order.
    pub fn run(
        &mut self,
        ctx: &FrameContext,
        frustum: &Frustum,
        roots: impl IntoIterator<Item = QuadTileNode>,
        out: &mut Vec<CoveringTile>,
    ) -> TraversalStats {
        let mut stats = TraversalStats::default();
        self.stack.clear();
        self.stack.extend(roots);

        while let Some(node) = self.stack.pop() {
            stats.visited += 1;
            let mut fully_visible = node.fully_visible;

            if !fully_visible {
                stats.intersection_tests += 1;
                let intersection = if ctx.elevation_mode {
                    node.aabb.intersects(frustum)
                } else {
                    node.aabb.intersects_flat(frustum)
                };

                match intersection {
                    Intersection::Outside => {
                        stats.culled += 1;
                        continue;
                    }
                    Intersection::Inside => fully_visible = true,
                    Intersection::Intersecting => {}
                }
            }

            if node.z == ctx.max_tile_zoom() || !ctx.should_split(&node) {
                if (node.z as f64) < ctx.min_zoom {
                    stats.below_min_zoom += 1;
                    continue;
                }

                let id = node.id();
                out.push(CoveringTile {
                    id,
                    wrap: node.wrap,
                    distance: ctx.tile_distance(id, node.wrap),
                });
                stats.accepted += 1;
                continue;
            }

            stats.splits += 1;
            self.stack.extend(node.children(fully_visible));
        }

        trace!(
            "traversal: visited={} tests={} culled={} accepted={} below_min={} splits={}",
            stats.visited,
            stats.intersection_tests,
            stats.culled,
            stats.accepted,
            stats.below_min_zoom,
            stats.splits,
        );
        stats
    }
}
