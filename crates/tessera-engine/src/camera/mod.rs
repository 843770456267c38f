//! Orbit camera and the shared, cached camera matrices.

mod orbit;
mod projection;
mod shared;

pub use orbit::{Camera, MIN_ZOOM};
pub use projection::{screen_ortho, CameraMatrices};
pub use shared::SharedCamera;
