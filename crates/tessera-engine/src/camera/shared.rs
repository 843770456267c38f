use parking_lot::Mutex;

use crate::sync::Generation;

use super::{Camera, CameraMatrices};

#[derive(Debug)]
struct CameraState {
    camera: Camera,
    explicit: Option<CameraMatrices>,
    /// Matrices for the aspect ratio (by bit pattern) they were built for.
    cached: Option<(u32, CameraMatrices)>,
}

/// A camera shared between the control thread and the renderer.
///
/// One mutex guards the camera, an optional explicit matrix pair and the
/// cached matrices, so a reader never sees a half-invalidated cache.
#[derive(Debug)]
pub struct SharedCamera {
    state: Mutex<CameraState>,
    generation: Generation,
}

impl SharedCamera {
    pub fn new(camera: Camera) -> Self {
        Self {
            state: Mutex::new(CameraState {
                camera,
                explicit: None,
                cached: None,
            }),
            generation: Generation::new(),
        }
    }

    /// Copy of the current camera parameters.
    pub fn get(&self) -> Camera {
        self.state.lock().camera
    }

    /// Mutates the camera in place and invalidates the cached matrices.
    pub fn update<R>(&self, f: impl FnOnce(&mut Camera) -> R) -> R {
        let mut state = self.state.lock();
        let result = f(&mut state.camera);
        state.cached = None;
        self.generation.bump();
        result
    }

    /// Installs (or with `None`, removes) an explicit view/projection pair
    /// that takes precedence over the orbit parameters.
    pub fn set_override(&self, matrices: Option<CameraMatrices>) {
        let mut state = self.state.lock();
        state.explicit = matrices;
        state.cached = None;
        self.generation.bump();
    }

    pub fn has_override(&self) -> bool {
        self.state.lock().explicit.is_some()
    }

    /// Matrices for a viewport of the given aspect ratio.
    pub fn matrices(&self, aspect: f32) -> CameraMatrices {
        let mut state = self.state.lock();
        if let Some(explicit) = state.explicit {
            return explicit;
        }
        let key = aspect.to_bits();
        if let Some((cached_for, matrices)) = state.cached {
            if cached_for == key {
                return matrices;
            }
        }
        let matrices = state.camera.matrices(aspect);
        state.cached = Some((key, matrices));
        matrices
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }
}
