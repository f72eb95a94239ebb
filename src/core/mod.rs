//! Core types, errors, logging and the camera input record

pub mod types;
pub mod error;
pub mod logging;
pub mod camera;

pub use types::*;
pub use error::Error;
pub use camera::{CameraState, MapCamera};
