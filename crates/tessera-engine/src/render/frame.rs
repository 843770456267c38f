use std::sync::Arc;

use parking_lot::Mutex;

use crate::attribute::{builtin, AttributeRegistry, ProvideAttributes, UniformValue};
use crate::camera::CameraMatrices;

use super::Pass;

/// The matrices active for the pass being drawn.
///
/// The renderer swaps them between passes; the projection and view
/// providers read whatever is current when a shader is enabled.
#[derive(Debug, Clone, Default)]
pub struct FrameMatrices {
    current: Arc<Mutex<CameraMatrices>>,
}

impl FrameMatrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, matrices: CameraMatrices) {
        *self.current.lock() = matrices;
    }

    pub fn get(&self) -> CameraMatrices {
        *self.current.lock()
    }
}

impl ProvideAttributes for FrameMatrices {
    fn provide_attributes(&self, dst: &mut AttributeRegistry) {
        let proj = Arc::clone(&self.current);
        dst.register(builtin::PROJ_MATRIX, move || UniformValue::Mat4(proj.lock().proj));
        let view = Arc::clone(&self.current);
        dst.register(builtin::VIEW_MATRIX, move || UniformValue::Mat4(view.lock().view));
    }
}

/// Counters for one `render` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Draw calls issued, indexed by [`Pass::index`].
    pub draw_calls: [u32; 5],
    pub vertices: u64,
    /// Renderables whose vertex buffer was rebuilt this frame.
    pub rebuilt: u32,
    /// Renderables skipped because the view is not interactive.
    pub skipped: u32,
}

impl FrameStats {
    #[inline]
    pub fn draw_calls_in(&self, pass: Pass) -> u32 {
        self.draw_calls[pass.index()]
    }

    pub fn total_draw_calls(&self) -> u32 {
        self.draw_calls.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    #[test]
    fn providers_follow_current_matrices() {
        let frame = FrameMatrices::new();
        let mut reg = AttributeRegistry::new();
        frame.provide_attributes(&mut reg);

        let proj = Mat4::from_scale(glam::Vec3::splat(3.0));
        frame.set(CameraMatrices {
            view: Mat4::IDENTITY,
            proj,
        });
        assert_eq!(reg.evaluate(&builtin::PROJ_MATRIX), Some(UniformValue::Mat4(proj)));
        assert_eq!(
            reg.evaluate(&builtin::VIEW_MATRIX),
            Some(UniformValue::Mat4(Mat4::IDENTITY))
        );
    }
}
