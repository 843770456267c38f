//! Attribute and uniform registry.
//!
//! Every value a shader consumes is addressed by an [`AttributeId`]. Uniform
//! values come from zero-argument providers registered by the camera, the
//! lights and the materials; vertex arrays come from geometry.

mod id;
mod registry;
mod value;

pub mod builtin;

pub use id::AttributeId;
pub use registry::{AttributeRegistry, ProvideAttributes, Provider};
pub use value::{UniformKind, UniformValue};
