//! Map camera and the per-frame camera input record

use crate::core::types::{DMat4, DVec3};
use crate::geo::mercator::{self, LngLat};

/// Default vertical field of view in radians
pub const DEFAULT_FOV: f64 = 0.643_501_108_793_284_4;

/// Default tile size in pixels
pub const DEFAULT_TILE_SIZE: f64 = 512.0;

/// Everything the tile selection needs from the host camera for one frame.
///
/// Hosts with their own transform fill this in directly; [`MapCamera::state`]
/// derives it from viewport, zoom, center, pitch and bearing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// Current (fractional) map zoom
    pub zoom: f64,
    /// View center
    pub center: LngLat,
    /// Camera position in normalized projected space (x, y in `[0, 1)`,
    /// z in projected-z units)
    pub camera_position: Option<DVec3>,
    /// Unit view direction: x east, y south, z up
    pub forward: DVec3,
    /// Camera pitch in radians (0 = looking straight down)
    pub pitch: f64,
    /// Inverse of the view-projection matrix; see [`MapCamera::view_projection`]
    /// for the world space it maps to
    pub inv_view_projection: Option<DMat4>,
    /// World width in pixels at `zoom`
    pub world_size: f64,
}

/// Perspective map camera orbiting a center point on the sea-level plane
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapCamera {
    /// Viewport width in pixels
    pub width: f64,
    /// Viewport height in pixels
    pub height: f64,
    /// Tile size in pixels
    pub tile_size: f64,
    /// Map zoom
    pub zoom: f64,
    /// Point under the middle of the viewport
    pub center: LngLat,
    /// Tilt away from straight down, in radians
    pub pitch: f64,
    /// Clockwise rotation from north, in radians
    pub bearing: f64,
    /// Vertical field of view in radians
    pub fov: f64,
}

impl MapCamera {
    /// Create a top-down camera
    pub fn new(width: f64, height: f64, zoom: f64, center: LngLat) -> Self {
        Self {
            width,
            height,
            tile_size: DEFAULT_TILE_SIZE,
            zoom,
            center,
            pitch: 0.0,
            bearing: 0.0,
            fov: DEFAULT_FOV,
        }
    }

    pub fn with_pitch(mut self, pitch_degrees: f64) -> Self {
        self.pitch = pitch_degrees.to_radians();
        self
    }

    pub fn with_bearing(mut self, bearing_degrees: f64) -> Self {
        self.bearing = bearing_degrees.to_radians();
        self
    }

    /// World width in pixels
    pub fn world_size(&self) -> f64 {
        self.tile_size * self.zoom.exp2()
    }

    /// Pixels per meter at the center latitude
    pub fn pixels_per_meter(&self) -> f64 {
        mercator::mercator_z_from_altitude(1.0, self.center.lat) * self.world_size()
    }

    /// Distance from the camera to the center point, in pixels
    pub fn camera_to_center_distance(&self) -> f64 {
        0.5 * self.height / (self.fov * 0.5).tan()
    }

    /// Unit view direction (x east, y south, z up)
    pub fn forward(&self) -> DVec3 {
        let (sin_p, cos_p) = self.pitch.sin_cos();
        let (sin_b, cos_b) = self.bearing.sin_cos();
        DVec3::new(sin_b * sin_p, -cos_b * sin_p, -cos_p)
    }

    /// Center point in world pixels
    fn center_point(&self) -> DVec3 {
        (self.center.to_mercator() * self.world_size()).extend(0.0)
    }

    /// Camera position in world pixels
    fn camera_point(&self) -> DVec3 {
        self.center_point() - self.forward() * self.camera_to_center_distance()
    }

    /// Camera position in normalized projected space
    pub fn camera_position(&self) -> DVec3 {
        // z: meters / circumference = pixels / world size
        self.camera_point() / self.world_size()
    }

    pub fn near_z(&self) -> f64 {
        self.height / 50.0
    }

    /// Distance to the farthest visible point on the sea-level plane, in pixels
    pub fn far_z(&self) -> f64 {
        let fov_above_center = self.fov * 0.5;
        let camera_to_sea_level = self.camera_to_center_distance();
        let top_half_surface = fov_above_center.sin() * camera_to_sea_level
            / (std::f64::consts::FRAC_PI_2 - self.pitch - fov_above_center).max(0.01).sin();
        let furthest = self.pitch.sin() * top_half_surface + camera_to_sea_level;

        // Margin for fragments lying exactly at the furthest distance
        furthest * 1.01
    }

    /// Projection times view.
    ///
    /// World space has x/y in pixels (`[0, world_size]` for the primary copy)
    /// and z in meters above sea level; clip space is GL (`[-1, 1]` depth).
    pub fn view_projection(&self) -> DMat4 {
        let forward = self.forward();
        let north = DVec3::new(self.bearing.sin(), -self.bearing.cos(), 0.0);
        let eye = self.camera_point();

        let meters_to_pixels = DMat4::from_scale(DVec3::new(1.0, 1.0, self.pixels_per_meter()));
        // y grows southward, so flip x to keep east on the right of the screen
        let view = DMat4::from_scale(DVec3::new(-1.0, 1.0, 1.0))
            * DMat4::look_at_rh(eye, eye + forward, north);
        let proj = DMat4::perspective_rh_gl(
            self.fov,
            self.width / self.height,
            self.near_z(),
            self.far_z(),
        );

        proj * view * meters_to_pixels
    }

    /// Inverse view-projection, `None` when the projection is degenerate
    pub fn inv_view_projection(&self) -> Option<DMat4> {
        let vp = self.view_projection();
        let det = vp.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(vp.inverse()).filter(|m| m.is_finite())
    }

    /// Snapshot for one frame of tile selection
    pub fn state(&self) -> CameraState {
        CameraState {
            zoom: self.zoom,
            center: self.center,
            camera_position: Some(self.camera_position()),
            forward: self.forward(),
            pitch: self.pitch,
            inv_view_projection: self.inv_view_projection(),
            world_size: self.world_size(),
        }
    }
}

impl Default for MapCamera {
    fn default() -> Self {
        Self::new(1024.0, 768.0, 0.0, LngLat::default())
    }
}
