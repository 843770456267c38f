//! Shader records and program binding.
//!
//! A shader is a plain data record (primitive mode, ordered uniform specs,
//! ordered vertex array specs, WGSL source) rather than a type hierarchy.
//! Built-in variants come from the [`ShaderKind`] table; custom shaders are
//! built with [`ShaderDesc::new`].

mod desc;
mod layout;
mod program;

pub mod builtin;

pub use builtin::ShaderKind;
pub use desc::{ArraySpec, PrimitiveMode, ShaderDesc, UniformSpec};
pub use layout::{UniformBlockLayout, UniformSlot, MAX_UNIFORM_BLOCK_SIZE};
pub use program::{BoundUniforms, Shader};
