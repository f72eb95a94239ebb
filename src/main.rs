//! Covering-tile inspector — prints the tiles a camera would draw.
//!
//! Usage: cargo run --bin tilecover -- [OPTIONS]
//!
//! Options:
//!   --lng <DEG>       Center longitude (default: 0)
//!   --lat <DEG>       Center latitude (default: 0)
//!   --zoom <Z>        Map zoom (default: 3)
//!   --pitch <DEG>     Camera pitch (default: 0)
//!   --bearing <DEG>   Camera bearing (default: 0)
//!   --width <PX>      Viewport width (default: 1024)
//!   --height <PX>     Viewport height (default: 768)
//!   --config <FILE>   JSON tile manager configuration

use std::time::Instant;

use tilecover::core::{logging, MapCamera, Result};
use tilecover::geo::LngLat;
use tilecover::tiles::{TileManager, TileManagerConfig};

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    let lng = parse_f64_arg(&args, "--lng").unwrap_or(0.0);
    let lat = parse_f64_arg(&args, "--lat").unwrap_or(0.0);
    let zoom = parse_f64_arg(&args, "--zoom").unwrap_or(3.0);
    let pitch = parse_f64_arg(&args, "--pitch").unwrap_or(0.0);
    let bearing = parse_f64_arg(&args, "--bearing").unwrap_or(0.0);
    let width = parse_f64_arg(&args, "--width").unwrap_or(1024.0);
    let height = parse_f64_arg(&args, "--height").unwrap_or(768.0);

    let config = match parse_str_arg(&args, "--config") {
        Some(path) => TileManagerConfig::from_file(path)?,
        None => TileManagerConfig::default(),
    };
    log::info!("config: {:?}", config);

    let camera = MapCamera::new(width, height, zoom, LngLat::new(lng, lat))
        .with_pitch(pitch)
        .with_bearing(bearing);
    let mut manager = TileManager::new(config)?;

    let start = Instant::now();
    let tiles = manager.covering_tiles(&camera.state());
    let elapsed = start.elapsed();

    println!("=== Covering tiles ===");
    println!("Center: ({lng}, {lat})  zoom {zoom}  pitch {pitch}  bearing {bearing}");
    for tile in tiles {
        println!("{:>12}  wrap {:>2}  distance {:.3}", tile.id.key(), tile.wrap, tile.distance);
    }

    let stats = manager.last_stats();
    println!();
    println!(
        "{} tiles in {:.3}ms ({} nodes visited, {} frustum tests, {} culled)",
        stats.accepted,
        elapsed.as_secs_f64() * 1000.0,
        stats.visited,
        stats.intersection_tests,
        stats.culled,
    );
    Ok(())
}

fn parse_f64_arg(args: &[String], flag: &str) -> Option<f64> {
    parse_str_arg(args, flag).and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
