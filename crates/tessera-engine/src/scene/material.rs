use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::attribute::{builtin, AttributeId, AttributeRegistry, ProvideAttributes, UniformValue};
use crate::shader::{PrimitiveMode, ShaderDesc, ShaderKind};

use super::Texture;

/// Which shader a material draws with.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    /// Material color, any primitive mode.
    Flat,
    /// Per-vertex colors, any primitive mode.
    VertexColored,
    Textured(Arc<Texture>),
    Shaded,
    Custom(Arc<ShaderDesc>),
}

/// Appearance of a mesh: a shader choice plus the uniforms it feeds.
///
/// Clones share the color cell, so a color set on the control thread is
/// seen by the next frame without a rebuild.
#[derive(Clone)]
pub struct Material {
    kind: MaterialKind,
    color: Arc<RwLock<[f32; 4]>>,
    extra: AttributeRegistry,
}

impl Material {
    fn with_kind(kind: MaterialKind, color: [f32; 4]) -> Self {
        Self {
            kind,
            color: Arc::new(RwLock::new(color)),
            extra: AttributeRegistry::new(),
        }
    }

    pub fn flat(color: [f32; 4]) -> Self {
        Self::with_kind(MaterialKind::Flat, color)
    }

    pub fn vertex_colored() -> Self {
        Self::with_kind(MaterialKind::VertexColored, [1.0; 4])
    }

    pub fn textured(texture: Arc<Texture>, tint: [f32; 4]) -> Self {
        Self::with_kind(MaterialKind::Textured(texture), tint)
    }

    pub fn shaded(color: [f32; 4]) -> Self {
        Self::with_kind(MaterialKind::Shaded, color)
    }

    /// Material for a user shader. Uniforms the shader declares beyond the
    /// built-ins are supplied with [`with_uniform`](Self::with_uniform).
    pub fn custom(shader: Arc<ShaderDesc>, color: [f32; 4]) -> Self {
        Self::with_kind(MaterialKind::Custom(shader), color)
    }

    pub fn with_uniform<F>(mut self, id: AttributeId, provider: F) -> Self
    where
        F: Fn() -> UniformValue + Send + Sync + 'static,
    {
        self.extra.register(id, provider);
        self
    }

    #[inline]
    pub fn kind(&self) -> &MaterialKind {
        &self.kind
    }

    #[inline]
    pub fn color(&self) -> [f32; 4] {
        *self.color.read()
    }

    pub fn set_color(&self, color: [f32; 4]) {
        *self.color.write() = color;
    }

    /// Shader for geometry drawn with `mode`.
    pub fn shader(&self, mode: PrimitiveMode) -> Arc<ShaderDesc> {
        match &self.kind {
            MaterialKind::Flat => ShaderKind::FlatColor(mode).shared(),
            MaterialKind::VertexColored => ShaderKind::VertexColor(mode).shared(),
            MaterialKind::Textured(_) => ShaderKind::Textured.shared(),
            MaterialKind::Shaded => ShaderKind::Shaded.shared(),
            MaterialKind::Custom(desc) => Arc::clone(desc),
        }
    }
}

impl ProvideAttributes for Material {
    fn provide_attributes(&self, dst: &mut AttributeRegistry) {
        let color = Arc::clone(&self.color);
        dst.register(builtin::MATERIAL_COLOR, move || UniformValue::Vec4(*color.read()));
        if let MaterialKind::Textured(texture) = &self.kind {
            dst.register_constant(
                builtin::MATERIAL_TEXTURE,
                UniformValue::Texture(Some(Arc::clone(texture))),
            );
        }
        dst.extend_from(&self.extra);
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("kind", &self.kind)
            .field("color", &self.color())
            .field("extra", &self.extra)
            .finish()
    }
}
