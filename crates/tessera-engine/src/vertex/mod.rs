//! Interleaved vertex data.
//!
//! A [`VertexLayout`] is resolved once from a shader and a geometry. Every
//! rebuild interleaves the geometry into the shared [`ScratchArena`] and
//! uploads it to the renderable's [`VertexBuffer`].

mod buffer;
mod layout;
mod scratch;

pub use buffer::VertexBuffer;
pub use layout::{LayoutEntry, VertexLayout};
pub use scratch::{ScratchArena, MIN_SCRATCH_CAPACITY};
