use crate::backend::{BackendError, BufferHandle, GpuBackend};
use crate::scene::GeometryAttribute;

use super::{ScratchArena, VertexLayout};

/// GPU vertex storage for one renderable.
///
/// Storage is created on the first [`update`](Self::update) and reused by
/// later ones. The drawable vertex count is the uploaded length divided by
/// the stride.
#[derive(Debug)]
pub struct VertexBuffer {
    label: String,
    layout: VertexLayout,
    handle: Option<BufferHandle>,
    uploaded: usize,
}

impl VertexBuffer {
    pub fn new(label: impl Into<String>, layout: VertexLayout) -> Self {
        Self {
            label: label.into(),
            layout,
            handle: None,
            uploaded: 0,
        }
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    #[inline]
    pub fn handle(&self) -> Option<BufferHandle> {
        self.handle
    }

    /// Replaces the layout; takes effect on the next update.
    pub fn set_layout(&mut self, layout: VertexLayout) {
        self.layout = layout;
    }

    /// Number of vertices currently drawable.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        match self.layout.stride() {
            0 => 0,
            stride => (self.uploaded / stride as usize) as u32,
        }
    }

    /// Interleaves `attributes` through `scratch` and uploads the result.
    pub fn update(
        &mut self,
        gpu: &mut dyn GpuBackend,
        attributes: &[GeometryAttribute],
        scratch: &mut ScratchArena,
    ) -> Result<(), BackendError> {
        let data = self.layout.interleave(attributes, scratch);
        let handle = match self.handle {
            Some(handle) => handle,
            None => {
                let handle = gpu.create_vertex_buffer(&self.label)?;
                self.handle = Some(handle);
                handle
            }
        };
        gpu.upload_vertex_data(handle, data)?;
        self.uploaded = data.len();
        Ok(())
    }

    /// Destroys the GPU storage. The buffer can be updated again afterwards.
    pub fn release(&mut self, gpu: &mut dyn GpuBackend) {
        if let Some(handle) = self.handle.take() {
            gpu.destroy_buffer(handle);
        }
        self.uploaded = 0;
    }
}
