//! Tessera engine crate.
//!
//! A multi-pass forward renderer. The scene (meshes, camera, lights) is
//! mutated from a control thread; the render thread turns it into an ordered
//! sequence of draw calls across five fixed passes.
//!
//! Layering, leaves first:
//! - `attribute`: named uniform slots and their value providers
//! - `shader`: shader records, uniform block layout, program binding
//! - `vertex`: interleaved vertex layouts, scratch arena, GPU vertex buffers
//! - `render`: renderables, pass table and the forward renderer
//! - `backend`: the GPU seam (`GpuBackend`) with wgpu and recording backends
//!
//! `scene` and `camera` hold the shared state the control thread mutates;
//! `device` and `logging` are the windowing-side setup.

pub mod attribute;
pub mod backend;
pub mod camera;
pub mod device;
pub mod error;
pub mod logging;
pub mod render;
pub mod scene;
pub mod shader;
pub mod sync;
pub mod vertex;

pub use error::{ConfigError, RenderError};
