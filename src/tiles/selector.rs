//! Per-frame covering-tile selection and nearest-first ordering

use log::{debug, trace, warn};

use crate::core::camera::CameraState;
use crate::core::error::Error;
use crate::core::types::{DVec3, Result};
use crate::geo::GridSpace;
use crate::math::Frustum;
use super::config::{TileManagerConfig, MAX_TILE_ZOOM};
use super::tile_id::CoveringTile;
use super::traversal::{
    FrameContext, QuadTileNode, QuadtreeTraversal, TraversalStats,
    MAX_ELEVATION, NUM_WORLD_COPIES, ROOT_TILE_ZOOM,
};

/// Altitude of the view center in meters.
///
/// Terrain height under the center is not sampled, so elevation-mode depth
/// and visibility are relative to sea level.
pub const CENTER_ALTITUDE: f64 = 0.0;

/// Sort tiles nearest-first. Stable: equal distances keep collection order.
pub fn sort_by_distance(tiles: &mut [CoveringTile]) {
    tiles.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

/// Decides once per frame which tiles to draw.
///
/// Owns the configuration and the buffers reused across frames.
#[derive(Debug)]
pub struct TileManager {
    config: TileManagerConfig,
    traversal: QuadtreeTraversal,
    tiles: Vec<CoveringTile>,
    frustum: Option<Frustum>,
    stats: TraversalStats,
}

impl TileManager {
    pub fn new(config: TileManagerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            traversal: QuadtreeTraversal::new(),
            tiles: Vec::new(),
            frustum: None,
            stats: TraversalStats::default(),
        })
    }

    pub fn config(&self) -> &TileManagerConfig {
        &self.config
    }

    /// Frustum built by the last call, if it got that far
    pub fn frustum(&self) -> Option<&Frustum> {
        self.frustum.as_ref()
    }

    /// Counters from the last traversal
    pub fn last_stats(&self) -> TraversalStats {
        self.stats
    }

    /// Tiles to draw this frame, nearest to the view center first.
    ///
    /// Never fails: when the camera cannot be evaluated the result is empty
    /// and the reason is logged.
    pub fn covering_tiles(&mut self, state: &CameraState) -> &[CoveringTile] {
        if let Err(err) = self.try_covering_tiles(state) {
            match err {
                Error::NoFrustum(_) => warn!("no covering tiles: {err}"),
                _ => debug!("no covering tiles: {err}"),
            }
        }
        &self.tiles
    }

    /// `"z-x-y"` keys of [`TileManager::covering_tiles`]
    pub fn covering_tile_keys(&mut self, state: &CameraState) -> Vec<String> {
        self.covering_tiles(state).iter().map(|t| t.id.key()).collect()
    }

    /// Like [`TileManager::covering_tiles`], reporting why nothing was selected.
    pub fn try_covering_tiles(&mut self, state: &CameraState) -> Result<&[CoveringTile]> {
        self.tiles.clear();
        self.frustum = None;
        self.stats = TraversalStats::default();

        let ctx = self.frame_context(state)?;
        let max_tile_zoom = ctx.max_tile_zoom();

        let inv_view_proj = state
            .inv_view_projection
            .ok_or_else(|| Error::NoFrustum("no inverse view-projection matrix".into()))?;
        let frustum = Frustum::from_inv_view_projection(&inv_view_proj, state.world_size, max_tile_zoom)?;

        trace!(
            "frame z{} pitch {:.1}: center={:?} camera={:?} height={} frustum bounds={:?}",
            max_tile_zoom,
            state.pitch.to_degrees(),
            ctx.center,
            ctx.camera,
            ctx.camera_height,
            frustum.bounds,
        );

        let (min_altitude, max_altitude) = if self.config.elevation_mode {
            (-MAX_ELEVATION, MAX_ELEVATION)
        } else {
            (0.0, 0.0)
        };
        let copies = if self.config.render_world_copies { NUM_WORLD_COPIES } else { 0 };
        let world_size = ctx.grid.world_size;
        let roots = (-copies..=copies)
            .map(|wrap| QuadTileNode::root(wrap, world_size, min_altitude, max_altitude));

        self.stats = self.traversal.run(&ctx, &frustum, roots, &mut self.tiles);
        self.frustum = Some(frustum);

        sort_by_distance(&mut self.tiles);
        Ok(&self.tiles)
    }

    /// Convert the camera state into world-discrete space
    fn frame_context(&self, state: &CameraState) -> Result<FrameContext> {
        if state.zoom < self.config.min_zoom {
            return Err(Error::ZoomOutOfRange {
                zoom: state.zoom,
                min_zoom: self.config.min_zoom,
            });
        }

        // Only the sampling resolution is clamped; the frustum still comes
        // from the real camera.
        let sampling_zoom = state.zoom.min(self.config.max_zoom);
        let max_tile_zoom = sampling_zoom.floor().clamp(0.0, MAX_TILE_ZOOM as f64) as u8;
        let grid = GridSpace::new(max_tile_zoom, state.center.lat);

        let camera = state.camera_position.ok_or(Error::NoCameraPosition)?;
        let camera_altitude = camera.z * grid.z_to_meter;
        let center = grid.lng_lat_to_grid(state.center);

        Ok(FrameContext {
            grid,
            root_zoom: ROOT_TILE_ZOOM,
            min_zoom: self.config.min_zoom,
            center: center.extend(CENTER_ALTITUDE),
            camera: DVec3::new(camera.x * grid.world_size, camera.y * grid.world_size, camera_altitude),
            camera_height: (camera_altitude - CENTER_ALTITUDE) * grid.meter_to_grid(),
            forward: state.forward,
            elevation_mode: self.config.elevation_mode,
            split_mode: self.config.split_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::MapCamera;
    use crate::geo::LngLat;
    use crate::tiles::tile_id::TileId;

    fn manager() -> TileManager {
        TileManager::new(TileManagerConfig::default()).unwrap()
    }

    fn tile(z: u8, x: u32, y: u32, distance: f64) -> CoveringTile {
        CoveringTile { id: TileId::new(z, x, y), wrap: 0, distance }
    }

    #[test]
    fn test_sort_is_stable() {
        let mut tiles = vec![
            tile(2, 0, 0, 3.0),
            tile(2, 1, 0, 1.0),
            tile(2, 2, 0, 3.0),
            tile(2, 3, 0, 1.0),
        ];
        sort_by_distance(&mut tiles);
        let xs: Vec<u32> = tiles.iter().map(|t| t.id.x).collect();
        assert_eq!(xs, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = TileManagerConfig { min_zoom: 5.0, max_zoom: 2.0, ..Default::default() };
        assert!(matches!(TileManager::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_zoom_below_min_is_empty() {
        let config = TileManagerConfig { min_zoom: 4.0, ..Default::default() };
        let mut manager = TileManager::new(config).unwrap();
        let state = MapCamera::new(1024.0, 768.0, 3.5, LngLat::default()).state();

        assert!(matches!(
            manager.try_covering_tiles(&state),
            Err(Error::ZoomOutOfRange { .. })
        ));
        assert!(manager.covering_tiles(&state).is_empty());
        assert_eq!(manager.last_stats(), TraversalStats::default());
    }

    #[test]
    fn test_missing_camera_position_is_empty() {
        let mut manager = manager();
        let mut state = MapCamera::new(1024.0, 768.0, 3.0, LngLat::default()).state();
        state.camera_position = None;

        assert!(matches!(manager.try_covering_tiles(&state), Err(Error::NoCameraPosition)));
        assert!(manager.covering_tiles(&state).is_empty());
    }

    #[test]
    fn test_missing_matrix_is_empty() {
        let mut manager = manager();
        let mut state = MapCamera::new(1024.0, 768.0, 3.0, LngLat::default()).state();
        state.inv_view_projection = None;

        assert!(matches!(manager.try_covering_tiles(&state), Err(Error::NoFrustum(_))));
        assert!(manager.covering_tiles(&state).is_empty());
        assert!(manager.frustum().is_none());
    }

    #[test]
    fn test_failure_clears_previous_frame() {
        let mut manager = manager();
        let mut state = MapCamera::new(1024.0, 768.0, 3.0, LngLat::new(10.0, 10.0)).state();
        assert!(!manager.covering_tiles(&state).is_empty());
        assert!(manager.frustum().is_some());

        state.camera_position = None;
        assert!(manager.covering_tiles(&state).is_empty());
    }

    #[test]
    fn test_max_zoom_clamps_sampling() {
        let config = TileManagerConfig { max_zoom: 4.0, ..Default::default() };
        let mut manager = TileManager::new(config).unwrap();
        let state = MapCamera::new(1024.0, 768.0, 6.5, LngLat::new(3.0, 4.0)).state();

        let tiles = manager.covering_tiles(&state);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.id.z <= 4));
        assert!(tiles.iter().any(|t| t.id.z == 4));
    }

    #[test]
    fn test_keys_match_tiles() {
        let mut manager = manager();
        let state = MapCamera::new(1024.0, 768.0, 5.0, LngLat::new(-30.0, 45.0)).state();
        let tiles: Vec<CoveringTile> = manager.covering_tiles(&state).to_vec();
        let keys = manager.covering_tile_keys(&state);

        assert_eq!(keys.len(), tiles.len());
        assert_eq!(keys[0], tiles[0].id.key());
    }
}
