use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bitflags::bitflags;
use glam::Mat4;
use parking_lot::RwLock;

use crate::render::Pass;
use crate::sync::Generation;

use super::{Geometry, GeometryAttribute, Material};

bitflags! {
    /// Per-mesh render flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MeshFlags: u32 {
        const DONT_CAST_SHADOW = 1 << 0;
        /// Drawn only in interactive views.
        const INTERACTIVE_VIEWS_ONLY = 1 << 1;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct MeshState {
    material: Material,
    geometry: Arc<Geometry>,
    transform: Mat4,
    pass: Pass,
    flags: MeshFlags,
}

/// Consistent copy of a mesh, taken under one lock.
#[derive(Debug, Clone)]
pub struct MeshSnapshot {
    pub material: Material,
    pub geometry: Arc<Geometry>,
    pub transform: Mat4,
    pub pass: Pass,
    pub flags: MeshFlags,
    pub generation: u64,
}

impl MeshSnapshot {
    /// Geometry attributes in world space.
    pub fn world_attributes(&self) -> Vec<GeometryAttribute> {
        self.geometry.transformed(&self.transform)
    }
}

/// A drawable scene object.
///
/// Setters may be called from any thread; each one bumps the mesh generation
/// so the renderer rebuilds the matching renderable on its next frame.
#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    name: String,
    state: RwLock<MeshState>,
    generation: Generation,
}

impl Mesh {
    pub fn new(name: impl Into<String>, material: Material, geometry: Geometry, pass: Pass) -> Self {
        Self {
            id: MeshId::next(),
            name: name.into(),
            state: RwLock::new(MeshState {
                material,
                geometry: Arc::new(geometry),
                transform: Mat4::IDENTITY,
                pass,
                flags: MeshFlags::empty(),
            }),
            generation: Generation::new(),
        }
    }

    pub fn with_flags(self, flags: MeshFlags) -> Self {
        self.state.write().flags = flags;
        self
    }

    pub fn with_transform(self, transform: Mat4) -> Self {
        self.state.write().transform = transform;
        self
    }

    #[inline]
    pub fn id(&self) -> MeshId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.current()
    }

    pub fn pass(&self) -> Pass {
        self.state.read().pass
    }

    pub fn flags(&self) -> MeshFlags {
        self.state.read().flags
    }

    pub fn has_flag(&self, flag: MeshFlags) -> bool {
        self.flags().contains(flag)
    }

    pub fn transform(&self) -> Mat4 {
        self.state.read().transform
    }

    pub fn geometry(&self) -> Arc<Geometry> {
        Arc::clone(&self.state.read().geometry)
    }

    pub fn material(&self) -> Material {
        self.state.read().material.clone()
    }

    fn mutate(&self, f: impl FnOnce(&mut MeshState)) {
        let mut state = self.state.write();
        f(&mut state);
        self.generation.bump();
    }

    pub fn set_pass(&self, pass: Pass) {
        self.mutate(|s| s.pass = pass);
    }

    pub fn set_flags(&self, flags: MeshFlags) {
        self.mutate(|s| s.flags = flags);
    }

    pub fn set_transform(&self, transform: Mat4) {
        self.mutate(|s| s.transform = transform);
    }

    pub fn set_geometry(&self, geometry: Geometry) {
        self.mutate(|s| s.geometry = Arc::new(geometry));
    }

    pub fn set_material(&self, material: Material) {
        self.mutate(|s| s.material = material);
    }

    /// Forces a rebuild without changing anything.
    pub fn request_update(&self) {
        self.generation.bump();
    }

    pub fn snapshot(&self) -> MeshSnapshot {
        let state = self.state.read();
        MeshSnapshot {
            material: state.material.clone(),
            geometry: Arc::clone(&state.geometry),
            transform: state.transform,
            pass: state.pass,
            flags: state.flags,
            generation: self.generation.current(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> Mesh {
        Mesh::new(
            "tri",
            Material::flat([1.0; 4]),
            Geometry::triangles(vec![0.0; 9]),
            Pass::Depth,
        )
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(mesh().id(), mesh().id());
    }

    #[test]
    fn every_setter_bumps_generation() {
        let m = mesh();
        let g = m.generation();
        m.set_pass(Pass::Transparency);
        m.set_flags(MeshFlags::INTERACTIVE_VIEWS_ONLY);
        m.set_transform(Mat4::from_scale(glam::Vec3::splat(2.0)));
        m.set_geometry(Geometry::triangles(vec![1.0; 9]));
        m.request_update();
        assert_eq!(m.generation(), g + 5);
        assert_eq!(m.pass(), Pass::Transparency);
        assert!(m.has_flag(MeshFlags::INTERACTIVE_VIEWS_ONLY));
    }

    #[test]
    fn snapshot_applies_transform() {
        let m = mesh().with_transform(Mat4::from_translation(glam::Vec3::X));
        let snap = m.snapshot();
        let world = snap.world_attributes();
        assert_eq!(&world[0].data[..3], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn builder_flags_do_not_bump() {
        let m = mesh().with_flags(MeshFlags::DONT_CAST_SHADOW);
        assert_eq!(m.generation(), 0);
        assert_eq!(m.flags(), MeshFlags::DONT_CAST_SHADOW);
    }
}
