//! Mathematical utilities and data structures

pub mod aabb;
pub mod frustum;

pub use aabb::Aabb;
pub use frustum::{Frustum, Intersection, Plane};
