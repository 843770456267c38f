use std::sync::Arc;

use crate::attribute::AttributeRegistry;
use crate::backend::GpuBackend;
use crate::error::{ConfigError, RenderError};
use crate::scene::{GeometryAttribute, Mesh, MeshFlags, MeshSnapshot};
use crate::shader::{BoundUniforms, Shader, ShaderDesc, UniformBlockLayout};
use crate::sync::Observed;
use crate::vertex::{ScratchArena, VertexBuffer, VertexLayout};

use super::{Pass, ViewKind};

/// Everything derived from one mesh snapshot.
struct Resolved {
    desc: Arc<ShaderDesc>,
    layout: VertexLayout,
    uniforms: BoundUniforms,
    world: Vec<GeometryAttribute>,
}

fn resolve(mesh: &Mesh, snapshot: &MeshSnapshot, globals: &AttributeRegistry) -> Result<Resolved, ConfigError> {
    let desc = snapshot.material.shader(snapshot.geometry.mode());
    UniformBlockLayout::new(&desc)?;

    // Checked on the source arrays; the transform works in whole vertices.
    let layout = VertexLayout::resolve(&desc, snapshot.geometry.attributes())?;
    let world = snapshot.world_attributes();

    let mut material = AttributeRegistry::new();
    material.collect_from(&snapshot.material);
    let uniforms = BoundUniforms::resolve(&desc, &[&material, globals])?;

    log::trace!(
        "mesh `{}`: shader `{}`, {} vertices, stride {}",
        mesh.name(),
        desc.name,
        layout.vertex_count(),
        layout.stride()
    );

    Ok(Resolved {
        desc,
        layout,
        uniforms,
        world,
    })
}

/// Render-thread state for one mesh: its shader, bound uniforms and
/// vertex buffer.
///
/// A renderable rebuilds itself when the mesh generation moves or when it is
/// marked dirty. Rebuilding re-validates the shader/geometry pairing.
pub struct Renderable {
    mesh: Arc<Mesh>,
    pass: Pass,
    flags: MeshFlags,
    shader: Shader,
    uniforms: BoundUniforms,
    buffer: VertexBuffer,
    pending: Option<Vec<GeometryAttribute>>,
    observed: Observed,
}

impl Renderable {
    /// Validates the pairing of the mesh's shader and geometry. Nothing is
    /// uploaded until the first [`update`](Self::update).
    pub fn new(mesh: Arc<Mesh>, globals: &AttributeRegistry) -> Result<Self, ConfigError> {
        let snapshot = mesh.snapshot();
        let resolved = resolve(&mesh, &snapshot, globals)?;
        let mut observed = Observed::new();
        observed.mark(snapshot.generation);

        Ok(Self {
            pass: snapshot.pass,
            flags: snapshot.flags,
            shader: Shader::new(resolved.desc),
            uniforms: resolved.uniforms,
            buffer: VertexBuffer::new(mesh.name(), resolved.layout),
            pending: Some(resolved.world),
            observed,
            mesh,
        })
    }

    #[inline]
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    #[inline]
    pub fn pass(&self) -> Pass {
        self.pass
    }

    #[inline]
    pub fn flags(&self) -> MeshFlags {
        self.flags
    }

    #[inline]
    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    #[inline]
    pub fn buffer(&self) -> &VertexBuffer {
        &self.buffer
    }

    /// Forces a rebuild before the next draw.
    pub fn mark_dirty(&mut self) {
        self.observed.invalidate();
    }

    pub fn is_visible_in(&self, kind: ViewKind) -> bool {
        kind == ViewKind::Interactive || !self.flags.contains(MeshFlags::INTERACTIVE_VIEWS_ONLY)
    }

    /// Brings GPU data in line with the mesh. Returns `true` if the vertex
    /// buffer was (re)uploaded.
    pub fn update(
        &mut self,
        gpu: &mut dyn GpuBackend,
        globals: &AttributeRegistry,
        scratch: &mut ScratchArena,
    ) -> Result<bool, RenderError> {
        if self.observed.is_stale(self.mesh.generation()) {
            let snapshot = self.mesh.snapshot();
            let resolved = resolve(&self.mesh, &snapshot, globals)?;

            if **self.shader.desc() != *resolved.desc {
                log::debug!(
                    "mesh `{}` switches shader `{}` -> `{}`",
                    self.mesh.name(),
                    self.shader.name(),
                    resolved.desc.name
                );
                self.shader = Shader::new(resolved.desc);
            }
            if self.pass != snapshot.pass {
                log::debug!(
                    "mesh `{}` moves {} -> {}",
                    self.mesh.name(),
                    self.pass.name(),
                    snapshot.pass.name()
                );
            }
            self.pass = snapshot.pass;
            self.flags = snapshot.flags;
            self.uniforms = resolved.uniforms;
            self.buffer.set_layout(resolved.layout);
            self.pending = Some(resolved.world);
            self.observed.mark(snapshot.generation);
        }

        match self.pending.take() {
            Some(world) => {
                self.buffer.update(gpu, &world, scratch)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Enables the shader, draws the buffer, disables the shader.
    /// Returns the number of vertices drawn.
    pub fn render(&mut self, gpu: &mut dyn GpuBackend) -> Result<u32, RenderError> {
        if self.buffer.vertex_count() == 0 {
            log::trace!("mesh `{}` has no vertices, skipped", self.mesh.name());
            return Ok(0);
        }
        self.shader.enable(gpu, &self.uniforms)?;
        let drawn = self.shader.render(gpu, &self.buffer);
        self.shader.disable(gpu);
        Ok(drawn?)
    }

    /// Destroys GPU storage.
    pub fn release(&mut self, gpu: &mut dyn GpuBackend) {
        self.buffer.release(gpu);
    }
}

impl std::fmt::Debug for Renderable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderable")
            .field("mesh", &self.mesh.name())
            .field("pass", &self.pass)
            .field("shader", &self.shader)
            .field("vertices", &self.buffer.vertex_count())
            .finish()
    }
}
