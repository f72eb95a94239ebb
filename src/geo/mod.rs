//! Geographic coordinate conversion

pub mod mercator;

pub use mercator::{GridSpace, LngLat};
