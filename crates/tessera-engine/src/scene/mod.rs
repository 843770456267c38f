//! Scene content shared between the control thread and the render thread.
//!
//! Everything here is `Send + Sync`. Mutations bump a generation counter;
//! the renderer compares generations once per frame to decide what to rebuild.

mod geometry;
mod light;
mod material;
mod mesh;
mod store;
mod texture;

pub use geometry::{Bounds, Geometry, GeometryAttribute};
pub use light::{Light, LightKind, LightSet, LIGHT_STRIDE, MAX_LIGHTS};
pub use material::{Material, MaterialKind};
pub use mesh::{Mesh, MeshFlags, MeshId, MeshSnapshot};
pub use store::Scene;
pub use texture::{Texture, TextureId};
