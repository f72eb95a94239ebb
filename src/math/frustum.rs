//! View frustum for culling tiles

use crate::core::error::Error;
use crate::core::types::{DMat4, DVec3, DVec4, Result};
use super::aabb::Aabb;

/// Result of classifying a bounding box against the frustum
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intersection {
    /// No overlap
    Outside,
    /// Partial overlap; children need their own test
    Intersecting,
    /// Box is entirely contained
    Inside,
}

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: DVec3,
    pub distance: f64,
}

impl Plane {
    pub fn new(normal: DVec3, distance: f64) -> Self {
        Self { normal, distance }
    }

    /// Plane through three points, normal following `(a - b) x (c - b)`
    fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Option<Self> {
        let normal = (a - b).cross(c - b);
        let len = normal.length();
        if !(len > 0.0 && len.is_finite()) {
            return None;
        }
        let normal = normal / len;
        Some(Self { normal, distance: -normal.dot(b) })
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: DVec3) -> f64 {
        self.normal.dot(point) + self.distance
    }
}

/// Clip-space cube corners, near face first (GL depth range `[-1, 1]`)
const CLIP_CORNERS: [DVec4; 8] = [
    DVec4::new(-1.0, 1.0, -1.0, 1.0),
    DVec4::new(1.0, 1.0, -1.0, 1.0),
    DVec4::new(1.0, -1.0, -1.0, 1.0),
    DVec4::new(-1.0, -1.0, -1.0, 1.0),
    DVec4::new(-1.0, 1.0, 1.0, 1.0),
    DVec4::new(1.0, 1.0, 1.0, 1.0),
    DVec4::new(1.0, -1.0, 1.0, 1.0),
    DVec4::new(-1.0, -1.0, 1.0, 1.0),
];

/// Corner triples for near, far, left, right, bottom, top
const PLANE_CORNERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [6, 5, 4],
    [0, 3, 7],
    [2, 1, 5],
    [3, 2, 6],
    [0, 4, 5],
];

/// View frustum with 6 planes (Near, Far, Left, Right, Bottom, Top) and its
/// 8 corner points, expressed in world-discrete space.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub points: [DVec3; 8],
    pub planes: [Plane; 6],
    /// Bounds of the corner points, used as a cheap separating-axis pre-test
    pub bounds: Aabb,
}

impl Frustum {
    /// Build a frustum from an inverse view-projection matrix.
    ///
    /// The matrix maps GL clip space to a world where x/y are pixels of a
    /// `world_size`-pixel-wide map and z is meters. The resulting frustum has
    /// x/y in world-discrete units at `zoom` (scaled by `2^zoom / world_size`)
    /// and keeps z in meters.
    pub fn from_inv_view_projection(inv_view_proj: &DMat4, world_size: f64, zoom: u8) -> Result<Self> {
        if !inv_view_proj.is_finite() {
            return Err(Error::NoFrustum("inverse view-projection is not finite".into()));
        }
        if !(world_size > 0.0) {
            return Err(Error::NoFrustum(format!("invalid world size {world_size}")));
        }

        let scale = (1u64 << zoom) as f64 / world_size;
        let mut points = [DVec3::ZERO; 8];
        for (point, corner) in points.iter_mut().zip(CLIP_CORNERS.iter()) {
            let s = *inv_view_proj * *corner;
            if !(s.w.abs() > f64::EPSILON) || !s.is_finite() {
                return Err(Error::NoFrustum("clip corner unprojects to infinity".into()));
            }
            *point = DVec3::new(s.x / s.w * scale, s.y / s.w * scale, s.z / s.w);
        }

        let centroid = points.iter().copied().sum::<DVec3>() / 8.0;
        let mut planes = [Plane::new(DVec3::ZERO, 0.0); 6];
        for (plane, [a, b, c]) in planes.iter_mut().zip(PLANE_CORNERS) {
            let mut p = Plane::from_points(points[a], points[b], points[c])
                .ok_or_else(|| Error::NoFrustum("degenerate frustum plane".into()))?;
            // Handedness of the host matrix decides the winding; normals point inward
            if p.distance_to_point(centroid) < 0.0 {
                p = Plane::new(-p.normal, -p.distance);
            }
            *plane = p;
        }

        let mut bounds = Aabb::new(points[0], points[0]);
        for p in &points[1..] {
            bounds.expand(*p);
        }

        Ok(Self { points, planes, bounds })
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: DVec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Classify a convex point set (box corners) against the six planes.
    ///
    /// Any plane with every point behind it separates the set from the
    /// frustum. The caller is expected to have done the bounds pre-test.
    pub fn classify_points(&self, points: &[DVec3]) -> Intersection {
        let mut fully_inside = true;

        for plane in &self.planes {
            let inside = points
                .iter()
                .filter(|p| plane.distance_to_point(**p) >= 0.0)
                .count();

            if inside == 0 {
                return Intersection::Outside;
            }
            if inside != points.len() {
                fully_inside = false;
            }
        }

        if fully_inside {
            Intersection::Inside
        } else {
            Intersection::Intersecting
        }
    }
}
