//! Forward renderer.
//!
//! Each frame the renderer synchronizes its renderables with the scene,
//! rebuilds the dirty ones, then walks the five passes in order:
//! apply the pass state, swap in the pass projection, draw every renderable
//! assigned to the pass. GPU state defaults are restored at the end.

mod forward;
mod frame;
mod pass;
mod renderable;
mod view;

pub use forward::{ForwardRenderer, RendererConfig};
pub use frame::{FrameMatrices, FrameStats};
pub use pass::{CullFace, Pass, PassState, PassTable, PolygonOffset, ProjectionSpace};
pub use renderable::Renderable;
pub use view::{View, ViewKind, Viewport};
