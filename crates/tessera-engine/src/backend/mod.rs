//! The GPU seam.
//!
//! Shaders, vertex buffers and the renderer talk to the GPU only through
//! [`GpuBackend`], on the render thread. [`WgpuBackend`] drives real
//! hardware; [`RecordingBackend`] logs every call for tests and headless use.

use std::sync::Arc;

use thiserror::Error;

use crate::attribute::UniformValue;
use crate::error::ConfigError;
use crate::render::{Pass, PassState, Viewport};
use crate::shader::{PrimitiveMode, ShaderDesc, UniformSpec};
use crate::vertex::VertexLayout;

pub mod recording;
mod wgpu_backend;

pub use recording::RecordingBackend;
pub use wgpu_backend::WgpuBackend;

/// Opaque handle to a compiled program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(u32);

impl ProgramHandle {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// Opaque handle to vertex storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(u32);

impl BufferHandle {
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("program `{name}` failed to compile: {message}")]
    ProgramCompilation { name: String, message: String },

    #[error("unknown vertex buffer {0:?}")]
    UnknownBuffer(BufferHandle),

    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramHandle),

    #[error("draw issued without {missing}")]
    IncompleteDraw { missing: &'static str },

    #[error("failed to create {what}: {message}")]
    ResourceCreation { what: String, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// GPU command surface used by the renderer.
///
/// Calls arrive in a fixed shape per frame: `begin_frame`, then per pass
/// `apply_pass_state` followed by enable/uniform/bind/draw/unbind/disable
/// groups, then `restore_defaults`.
pub trait GpuBackend {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    fn begin_frame(&mut self, viewport: Viewport);

    /// Compiles and links `desc`. Failures are fatal for the caller.
    fn compile_program(&mut self, desc: &Arc<ShaderDesc>) -> BackendResult<ProgramHandle>;

    fn create_vertex_buffer(&mut self, label: &str) -> BackendResult<BufferHandle>;

    /// Replaces the contents of `buffer`, growing it as needed.
    fn upload_vertex_data(&mut self, buffer: BufferHandle, data: &[f32]) -> BackendResult<()>;

    fn destroy_buffer(&mut self, buffer: BufferHandle);

    fn apply_pass_state(&mut self, pass: Pass, state: &PassState);

    fn enable_program(&mut self, program: ProgramHandle);

    /// Sets uniform `index` (declaration order) of the enabled program.
    fn set_uniform(&mut self, index: usize, spec: &UniformSpec, value: &UniformValue);

    fn bind_vertex_buffer(&mut self, buffer: BufferHandle, layout: &VertexLayout);

    /// Draws `count` vertices of the bound buffer with the enabled program.
    /// Fails when either is missing or unknown.
    fn draw_arrays(&mut self, mode: PrimitiveMode, first: u32, count: u32) -> BackendResult<()>;

    fn unbind_vertex_buffer(&mut self);

    fn disable_program(&mut self);

    /// Restores default state: blending off, depth writes on.
    fn restore_defaults(&mut self);
}
