//! GPU device, surface and depth target.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue, configures the surface
//! and keeps a depth texture matching the drawable size. Window creation
//! stays with the application; anything convertible into a
//! [`wgpu::SurfaceTarget`] (e.g. `Arc<winit::window::Window>`) is accepted.

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::{GpuFrame, SurfaceErrorAction};
pub use gpu::Gpu;
pub use init::GpuInit;
