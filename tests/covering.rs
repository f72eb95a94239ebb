//! End-to-end covering-tile scenarios driven through `MapCamera`

use std::collections::HashSet;

use tilecover::core::MapCamera;
use tilecover::geo::LngLat;
use tilecover::tiles::{CoveringTile, SplitMode, TileId, TileManager, TileManagerConfig};

fn manager(config: TileManagerConfig) -> TileManager {
    tilecover::core::logging::try_init();
    TileManager::new(config).unwrap()
}

/// Count how many returned tiles cover each finest-level cell of the primary world
fn rasterize(tiles: &[CoveringTile], max_z: u8) -> Vec<u32> {
    let n = 1usize << max_z;
    let mut cells = vec![0u32; n * n];
    for tile in tiles.iter().filter(|t| t.wrap == 0) {
        let scale = 1usize << (max_z - tile.id.z);
        let (x0, y0) = (tile.id.x as usize * scale, tile.id.y as usize * scale);
        for y in y0..y0 + scale {
            for x in x0..x0 + scale {
                cells[y * n + x] += 1;
            }
        }
    }
    cells
}

/// Tile containing `lng_lat` at zoom `z`
fn tile_under(lng_lat: LngLat, z: u8) -> TileId {
    let p = lng_lat.to_mercator() * (1u64 << z) as f64;
    TileId::new(z, p.x.floor() as u32, p.y.floor() as u32)
}

#[test]
fn test_straight_down_over_origin() {
    let config = TileManagerConfig { min_zoom: 0.0, max_zoom: 10.0, ..Default::default() };
    let mut manager = manager(config);
    let camera = MapCamera::new(1000.0, 700.0, 3.0, LngLat::new(0.0, 0.0));

    let tiles = manager.covering_tiles(&camera.state()).to_vec();
    let ids: HashSet<TileId> = tiles.iter().map(|t| t.id).collect();
    let expected: HashSet<TileId> = [(3, 3), (4, 3), (3, 4), (4, 4)]
        .into_iter()
        .map(|(x, y)| TileId::new(3, x, y))
        .collect();

    assert_eq!(ids, expected);
    assert!(ids.contains(&TileId::new(3, 4, 4)));
    assert!((tiles[0].distance - 0.5f64.sqrt()).abs() < 1e-9);
}

#[test]
fn test_whole_world_in_view_partitions_root() {
    let mut manager = manager(TileManagerConfig::default());
    // Viewport twice the world size: everything is inside the frustum
    let camera = MapCamera::new(16384.0, 16384.0, 4.0, LngLat::new(0.0, 0.0));

    let tiles = manager.covering_tiles(&camera.state()).to_vec();
    let cells = rasterize(&tiles, 4);
    assert!(cells.iter().all(|&c| c == 1), "gaps or overlaps: {cells:?}");

    // Root was fully inside, so no descendant was tested again
    let stats = manager.last_stats();
    assert_eq!(stats.intersection_tests, 1);
    assert_eq!(stats.culled, 0);
}

#[test]
fn test_pitched_view_has_no_overlaps() {
    let mut manager = manager(TileManagerConfig::default());
    let center = LngLat::new(13.4, 52.5);
    let camera = MapCamera::new(1280.0, 720.0, 7.3, center).with_pitch(60.0).with_bearing(20.0);

    let tiles = manager.covering_tiles(&camera.state()).to_vec();
    let cells = rasterize(&tiles, 7);
    assert!(cells.iter().all(|&c| c <= 1));

    let under = tile_under(center, 7);
    assert_eq!(cells[under.y as usize * 128 + under.x as usize], 1);

    let unique: HashSet<(i32, TileId)> = tiles.iter().map(|t| (t.wrap, t.id)).collect();
    assert_eq!(unique.len(), tiles.len());
    assert!(tiles.iter().all(|t| t.id.is_valid()));
}

#[test]
fn test_center_tile_at_full_resolution_for_any_pitch() {
    let center = LngLat::new(-73.98, 40.75);
    for pitch in [0.0, 30.0, 60.0, 75.0, 85.0] {
        let mut manager = manager(TileManagerConfig::default());
        let camera = MapCamera::new(1024.0, 768.0, 9.6, center).with_pitch(pitch);

        let tiles = manager.covering_tiles(&camera.state());
        let under = tile_under(center, 9);
        assert!(
            tiles.iter().any(|t| t.id == under),
            "pitch {pitch}: {under} missing"
        );
    }
}

#[test]
fn test_output_is_nearest_first() {
    let mut manager = manager(TileManagerConfig::default());
    let camera = MapCamera::new(1920.0, 1080.0, 11.2, LngLat::new(139.69, 35.68))
        .with_pitch(70.0)
        .with_bearing(-45.0);

    let tiles = manager.covering_tiles(&camera.state());
    assert!(tiles.len() > 4);
    assert!(tiles.windows(2).all(|w| w[0].distance <= w[1].distance));

    // Nearest tiles are the finest
    assert_eq!(tiles[0].id.z, 11);
    assert!(tiles.last().unwrap().id.z < 11);
}

#[test]
fn test_identical_inputs_identical_output() {
    let mut manager = manager(TileManagerConfig::default());
    let state = MapCamera::new(1024.0, 768.0, 8.8, LngLat::new(2.35, 48.85))
        .with_pitch(50.0)
        .state();

    let first = manager.covering_tile_keys(&state);
    let second = manager.covering_tile_keys(&state);
    assert_eq!(first, second);

    let mut fresh = TileManager::new(TileManagerConfig::default()).unwrap();
    assert_eq!(fresh.covering_tile_keys(&state), first);
}

#[test]
fn test_world_copies() {
    // Viewport four worlds wide at zoom 1
    let camera = MapCamera::new(4096.0, 768.0, 1.0, LngLat::new(0.0, 0.0));

    let mut single = manager(TileManagerConfig::default());
    let tiles = single.covering_tiles(&camera.state());
    assert!(tiles.iter().all(|t| t.wrap == 0));

    let config = TileManagerConfig { render_world_copies: true, ..Default::default() };
    let mut copies = manager(config);
    let tiles = copies.covering_tiles(&camera.state()).to_vec();
    let wraps: HashSet<i32> = tiles.iter().map(|t| t.wrap).collect();
    assert!(wraps.contains(&-1) && wraps.contains(&0) && wraps.contains(&1));
    assert!(!wraps.contains(&3));

    // The primary copy is still nearest
    assert_eq!(tiles[0].wrap, 0);
}

#[test]
fn test_elevation_mode() {
    let config = TileManagerConfig { elevation_mode: true, ..Default::default() };
    let mut manager = manager(config);
    let center = LngLat::new(86.92, 27.99);
    let camera = MapCamera::new(1024.0, 768.0, 10.4, center).with_pitch(45.0);

    let tiles = manager.covering_tiles(&camera.state()).to_vec();
    assert!(tiles.iter().any(|t| t.id == tile_under(center, 10)));
    assert!(rasterize(&tiles, 10).iter().all(|&c| c <= 1));
}

#[test]
fn test_split_modes_order_refinement() {
    let state = MapCamera::new(1280.0, 800.0, 9.0, LngLat::new(-0.12, 51.5))
        .with_pitch(60.0)
        .state();

    let mut splits = Vec::new();
    for split_mode in [SplitMode::Lazy, SplitMode::Default, SplitMode::Hurry] {
        let mut manager = manager(TileManagerConfig { split_mode, ..Default::default() });
        manager.covering_tiles(&state);
        splits.push(manager.last_stats().splits);
    }
    assert!(splits[0] <= splits[1] && splits[1] <= splits[2], "{splits:?}");
}

#[test]
fn test_min_zoom_gate() {
    let config = TileManagerConfig { min_zoom: 5.0, ..Default::default() };
    let mut manager = manager(config);

    let below = MapCamera::new(1024.0, 768.0, 4.99, LngLat::default()).state();
    assert!(manager.covering_tiles(&below).is_empty());

    let above = MapCamera::new(1024.0, 768.0, 6.5, LngLat::default()).with_pitch(70.0).state();
    let tiles = manager.covering_tiles(&above);
    assert!(!tiles.is_empty());
    assert!(tiles.iter().all(|t| t.id.z >= 5));
}
