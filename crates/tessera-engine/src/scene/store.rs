use std::sync::Arc;

use parking_lot::RwLock;

use crate::camera::{Camera, SharedCamera};
use crate::sync::{Generation, UpdateRequest};

use super::{LightSet, Mesh, MeshId};

/// The mutable world: meshes, lights and the camera.
///
/// Share it as `Arc<Scene>` between the control thread and the renderer.
#[derive(Debug)]
pub struct Scene {
    meshes: RwLock<Vec<Arc<Mesh>>>,
    lights: LightSet,
    camera: Arc<SharedCamera>,
    generation: Generation,
    redraw: UpdateRequest,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            meshes: RwLock::new(Vec::new()),
            lights: LightSet::new(),
            camera: Arc::new(SharedCamera::new(camera)),
            generation: Generation::new(),
            redraw: UpdateRequest::new(),
        }
    }

    /// Adds `mesh`. Returns `false` if a mesh with the same id is present.
    pub fn add_mesh(&self, mesh: Arc<Mesh>) -> bool {
        let mut meshes = self.meshes.write();
        if meshes.iter().any(|m| m.id() == mesh.id()) {
            return false;
        }
        log::debug!("scene: add mesh `{}` ({:?})", mesh.name(), mesh.id());
        meshes.push(mesh);
        self.changed();
        true
    }

    pub fn remove_mesh(&self, id: MeshId) -> Option<Arc<Mesh>> {
        let mut meshes = self.meshes.write();
        let index = meshes.iter().position(|m| m.id() == id)?;
        let mesh = meshes.remove(index);
        log::debug!("scene: remove mesh `{}` ({id:?})", mesh.name());
        self.changed();
        Some(mesh)
    }

    pub fn clear(&self) {
        self.meshes.write().clear();
        self.changed();
    }

    /// Meshes in insertion order.
    pub fn meshes(&self) -> Vec<Arc<Mesh>> {
        self.meshes.read().clone()
    }

    pub fn mesh(&self, id: MeshId) -> Option<Arc<Mesh>> {
        self.meshes.read().iter().find(|m| m.id() == id).cloned()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.read().len()
    }

    #[inline]
    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    #[inline]
    pub fn camera(&self) -> &Arc<SharedCamera> {
        &self.camera
    }

    /// Changes whenever the mesh list changes.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    #[inline]
    pub fn request_redraw(&self) {
        self.redraw.request();
    }

    /// Returns and clears the pending redraw request.
    #[inline]
    pub fn take_redraw_request(&self) -> bool {
        self.redraw.take()
    }

    fn changed(&self) {
        self.generation.bump();
        self.redraw.request();
    }
}
