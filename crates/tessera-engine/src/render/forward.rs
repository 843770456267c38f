use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use glam::Mat4;

use crate::attribute::AttributeRegistry;
use crate::backend::GpuBackend;
use crate::camera::{screen_ortho, CameraMatrices};
use crate::error::RenderError;
use crate::scene::{MeshId, Scene};
use crate::sync::Observed;
use crate::vertex::{ScratchArena, MIN_SCRATCH_CAPACITY};

use super::{FrameMatrices, FrameStats, PassTable, PolygonOffset, ProjectionSpace, Renderable, View};

/// Renderer tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Color the frame is cleared to, linear RGBA.
    pub clear_color: [f64; 4],

    /// Initial scratch arena capacity in floats.
    pub scratch_capacity: usize,

    /// Depth bias of the DEPTH pass, so overlays drawn at equal depth win.
    pub polygon_offset: Option<PolygonOffset>,

    /// Cull back faces in the DEPTH pass.
    pub cull_back_faces: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.08, 0.08, 0.1, 1.0],
            scratch_capacity: MIN_SCRATCH_CAPACITY,
            polygon_offset: Some(PolygonOffset {
                factor: 1.0,
                units: 3.0,
            }),
            cull_back_faces: false,
        }
    }
}

/// Multi-pass forward renderer over a shared [`Scene`].
///
/// Lives on the render thread. The scene may be mutated concurrently; the
/// renderer picks up changes at the start of the next frame.
pub struct ForwardRenderer {
    scene: Arc<Scene>,
    config: RendererConfig,
    passes: PassTable,
    globals: AttributeRegistry,
    matrices: FrameMatrices,
    renderables: Vec<Renderable>,
    membership: Observed,
    scratch: ScratchArena,
}

impl ForwardRenderer {
    pub fn new(scene: Arc<Scene>, config: RendererConfig) -> Self {
        let matrices = FrameMatrices::new();
        let mut globals = AttributeRegistry::new();
        globals.collect_from(&matrices);
        globals.collect_from(scene.lights());

        Self {
            passes: PassTable::new(&config),
            scratch: ScratchArena::with_capacity(config.scratch_capacity),
            scene,
            config,
            globals,
            matrices,
            renderables: Vec::new(),
            membership: Observed::new(),
        }
    }

    #[inline]
    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    #[inline]
    pub fn scratch(&self) -> &ScratchArena {
        &self.scratch
    }

    /// Renderer-wide uniform providers (frame matrices and lights).
    ///
    /// Extra globals registered here are visible to every shader; materials
    /// still take precedence.
    #[inline]
    pub fn globals_mut(&mut self) -> &mut AttributeRegistry {
        &mut self.globals
    }

    /// Forces the renderable of `mesh` to rebuild before its next draw.
    pub fn mark_dirty(&mut self, mesh: MeshId) -> bool {
        match self.renderables.iter_mut().find(|r| r.mesh().id() == mesh) {
            Some(r) => {
                r.mark_dirty();
                true
            }
            None => false,
        }
    }

    /// Brings the renderable list in line with the scene's meshes.
    ///
    /// New meshes are validated immediately; removed meshes release their
    /// GPU buffers. Renderables follow scene order. If a new mesh fails
    /// validation the current list is left untouched.
    pub fn sync(&mut self, gpu: &mut dyn GpuBackend) -> Result<(), RenderError> {
        let generation = self.scene.generation();
        if !self.membership.is_stale(generation) {
            return Ok(());
        }

        let meshes = self.scene.meshes();
        let current: HashSet<MeshId> = self.renderables.iter().map(|r| r.mesh().id()).collect();
        let mut added = HashMap::new();
        for mesh in meshes.iter().filter(|m| !current.contains(&m.id())) {
            match Renderable::new(Arc::clone(mesh), &self.globals) {
                Ok(renderable) => {
                    added.insert(mesh.id(), renderable);
                }
                Err(err) => {
                    for (_, mut renderable) in added {
                        renderable.release(gpu);
                    }
                    return Err(err.into());
                }
            }
        }

        let mut previous: HashMap<MeshId, Renderable> = self
            .renderables
            .drain(..)
            .map(|r| (r.mesh().id(), r))
            .collect();

        let mut next = Vec::with_capacity(meshes.len());
        for mesh in &meshes {
            if let Some(existing) = previous.remove(&mesh.id()) {
                next.push(existing);
            } else if let Some(renderable) = added.remove(&mesh.id()) {
                log::debug!("renderable added for mesh `{}`", mesh.name());
                next.push(renderable);
            }
        }

        for (_, mut gone) in previous {
            log::debug!("renderable removed for mesh `{}`", gone.mesh().name());
            gone.release(gpu);
        }

        self.renderables = next;
        self.membership.mark(generation);
        Ok(())
    }

    /// Draws one frame into `view`.
    ///
    /// Any error is fatal; the caller must stop rendering.
    pub fn render(&mut self, gpu: &mut dyn GpuBackend, view: &View) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();
        if !view.viewport.is_valid() {
            log::trace!("skipping frame for empty viewport {:?}", view.viewport);
            return Ok(stats);
        }

        gpu.begin_frame(view.viewport);
        self.sync(gpu)?;

        for renderable in &mut self.renderables {
            if renderable.update(gpu, &self.globals, &mut self.scratch)? {
                stats.rebuilt += 1;
            }
        }

        let camera = view.camera.matrices(view.viewport.aspect());
        let screen = CameraMatrices {
            view: Mat4::IDENTITY,
            proj: screen_ortho(view.viewport.width, view.viewport.height),
        };

        for (pass, state) in self.passes.iter() {
            self.matrices.set(match pass.space() {
                ProjectionSpace::Camera => camera,
                ProjectionSpace::Device => CameraMatrices::IDENTITY,
                ProjectionSpace::Screen => screen,
            });
            gpu.apply_pass_state(pass, state);

            for renderable in self.renderables.iter_mut().filter(|r| r.pass() == pass) {
                if !renderable.is_visible_in(view.kind) {
                    stats.skipped += 1;
                    continue;
                }
                let drawn = renderable.render(gpu)?;
                if drawn > 0 {
                    stats.draw_calls[pass.index()] += 1;
                    stats.vertices += u64::from(drawn);
                }
            }
        }

        gpu.restore_defaults();
        log::trace!(
            "frame: {} draws, {} vertices, {} rebuilt",
            stats.total_draw_calls(),
            stats.vertices,
            stats.rebuilt
        );
        Ok(stats)
    }

    /// Releases every GPU buffer. Renderables are rebuilt on the next frame.
    pub fn release_all(&mut self, gpu: &mut dyn GpuBackend) {
        for mut renderable in self.renderables.drain(..) {
            renderable.release(gpu);
        }
        self.membership.invalidate();
    }
}

impl std::fmt::Debug for ForwardRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardRenderer")
            .field("config", &self.config)
            .field("renderables", &self.renderables.len())
            .field("globals", &self.globals)
            .finish()
    }
}
