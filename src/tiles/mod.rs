//! Covering-tile selection: which tiles to draw this frame

pub mod config;
pub mod selector;
pub mod tile_id;
pub mod traversal;

pub use config::{SplitMode, TileManagerConfig, MAX_TILE_ZOOM};
pub use selector::{sort_by_distance, TileManager};
pub use tile_id::{CoveringTile, TileId};
pub use traversal::{QuadTileNode, QuadtreeTraversal, TraversalStats};
