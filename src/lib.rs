//! Tilecover - per-frame covering-tile selection for tiled maps
//!
//! Given the camera of one rendered frame, [`tiles::TileManager`] walks the
//! tile quadtree, culls against the view frustum, refines by view depth and
//! returns the tiles to draw, nearest to the view center first.
//!
//! ```
//! use tilecover::core::MapCamera;
//! use tilecover::geo::LngLat;
//! use tilecover::tiles::{TileManager, TileManagerConfig};
//!
//! let camera = MapCamera::new(1024.0, 768.0, 3.0, LngLat::new(2.35, 48.85)).with_pitch(45.0);
//! let mut manager = TileManager::new(TileManagerConfig::default()).unwrap();
//! let keys = manager.covering_tile_keys(&camera.state());
//! assert!(!keys.is_empty());
//! ```

pub mod core;
pub mod geo;
pub mod math;
pub mod tiles;
