//! Web-Mercator conversions between geographic, normalized-projected and
//! world-discrete grid coordinates.
//!
//! Three spaces are involved:
//! - geographic: longitude/latitude in degrees
//! - normalized projected: `[0, 1) x [0, 1)`, origin at the north-west corner,
//!   y growing southward
//! - world-discrete: normalized coordinates scaled by `2^max_tile_zoom`, so one
//!   grid unit is one tile at the finest sampled zoom

use std::f64::consts::PI;

use crate::core::types::DVec2;

/// Mean earth radius in meters
pub const EARTH_RADIUS: f64 = 6_371_008.8;

/// Equatorial circumference used as the reference for altitude scaling
pub const EARTH_CIRCUMFERENCE: f64 = 2.0 * PI * EARTH_RADIUS;

/// Latitude at which the Mercator square ends
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_129;

/// Geographic position in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Project to normalized Mercator space.
    ///
    /// Latitude is clamped to the Mercator square so the result stays finite.
    pub fn to_mercator(self) -> DVec2 {
        let lat = self.lat.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
        DVec2::new(mercator_x_from_lng(self.lng), mercator_y_from_lat(lat))
    }

    /// Inverse of [`LngLat::to_mercator`]
    pub fn from_mercator(p: DVec2) -> Self {
        Self {
            lng: lng_from_mercator_x(p.x),
            lat: lat_from_mercator_y(p.y),
        }
    }
}

pub fn mercator_x_from_lng(lng: f64) -> f64 {
    (180.0 + lng) / 360.0
}

pub fn mercator_y_from_lat(lat: f64) -> f64 {
    (180.0 - (180.0 / PI) * (PI / 4.0 + lat * PI / 360.0).tan().ln()) / 360.0
}

pub fn lng_from_mercator_x(x: f64) -> f64 {
    x * 360.0 - 180.0
}

pub fn lat_from_mercator_y(y: f64) -> f64 {
    let y2 = 180.0 - y * 360.0;
    360.0 / PI * (y2 * PI / 180.0).exp().atan() - 90.0
}

/// Length of the parallel at `lat` degrees, in meters
pub fn circumference_at_latitude(lat: f64) -> f64 {
    EARTH_CIRCUMFERENCE * lat.to_radians().cos()
}

/// Convert an altitude in meters to normalized projected z units at `lat`
pub fn mercator_z_from_altitude(altitude: f64, lat: f64) -> f64 {
    altitude / circumference_at_latitude(lat)
}

/// Inverse of [`mercator_z_from_altitude`]
pub fn altitude_from_mercator_z(z: f64, lat: f64) -> f64 {
    z * circumference_at_latitude(lat)
}

/// World-discrete grid for one frame: the grid resolution plus the altitude
/// scale factors at the view-center latitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpace {
    /// Finest sampled zoom level
    pub max_tile_zoom: u8,
    /// Grid units per normalized unit (`2^max_tile_zoom`)
    pub world_size: f64,
    /// Meters to normalized projected z
    pub meter_to_z: f64,
    /// Normalized projected z to meters
    pub z_to_meter: f64,
}

impl GridSpace {
    pub fn new(max_tile_zoom: u8, center_lat: f64) -> Self {
        let meter_to_z = mercator_z_from_altitude(1.0, center_lat);
        Self {
            max_tile_zoom,
            world_size: (1u64 << max_tile_zoom) as f64,
            meter_to_z,
            z_to_meter: 1.0 / meter_to_z,
        }
    }

    /// Meters to grid-altitude units
    pub fn meter_to_grid(&self) -> f64 {
        self.world_size * self.meter_to_z
    }

    /// Normalized projected coordinate to world-discrete grid
    pub fn to_grid(&self, mercator: DVec2) -> DVec2 {
        mercator * self.world_size
    }

    /// Geographic position to world-discrete grid
    pub fn lng_lat_to_grid(&self, lng_lat: LngLat) -> DVec2 {
        self.to_grid(lng_lat.to_mercator())
    }
}
