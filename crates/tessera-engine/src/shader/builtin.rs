//! Built-in shader variants.

use std::sync::Arc;

use crate::attribute::{builtin, UniformKind};
use crate::scene::{LIGHT_STRIDE, MAX_LIGHTS};

use super::{PrimitiveMode, ShaderDesc};

const FLAT_COLOR_WGSL: &str = include_str!("wgsl/flat_color.wgsl");
const VERTEX_COLOR_WGSL: &str = include_str!("wgsl/vertex_color.wgsl");
const TEXTURED_WGSL: &str = include_str!("wgsl/textured.wgsl");
const SHADED_WGSL: &str = include_str!("wgsl/shaded.wgsl");

/// Strategy table over the built-in shaders.
///
/// Each variant fixes which uniforms and vertex arrays the shader reads.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Material color, position only.
    FlatColor(PrimitiveMode),
    /// Per-vertex color.
    VertexColor(PrimitiveMode),
    /// Texture modulated by the material color.
    Textured,
    /// Lambert lighting against the scene lights.
    Shaded,
}

impl ShaderKind {
    pub fn mode(self) -> PrimitiveMode {
        match self {
            Self::FlatColor(mode) | Self::VertexColor(mode) => mode,
            Self::Textured | Self::Shaded => PrimitiveMode::Triangles,
        }
    }

    pub fn desc(self) -> ShaderDesc {
        match self {
            Self::FlatColor(mode) => {
                ShaderDesc::new(format!("flat_color_{}", mode.name()), FLAT_COLOR_WGSL, mode)
                    .uniform(builtin::PROJ_MATRIX, UniformKind::Mat4)
                    .uniform(builtin::VIEW_MATRIX, UniformKind::Mat4)
                    .uniform(builtin::MATERIAL_COLOR, UniformKind::Vec4)
                    .array(builtin::POSITION_ARRAY)
            }
            Self::VertexColor(mode) => {
                ShaderDesc::new(format!("vertex_color_{}", mode.name()), VERTEX_COLOR_WGSL, mode)
                    .uniform(builtin::PROJ_MATRIX, UniformKind::Mat4)
                    .uniform(builtin::VIEW_MATRIX, UniformKind::Mat4)
                    .array(builtin::POSITION_ARRAY)
                    .array(builtin::COLOR_ARRAY)
            }
            Self::Textured => ShaderDesc::new("textured", TEXTURED_WGSL, PrimitiveMode::Triangles)
                .uniform(builtin::PROJ_MATRIX, UniformKind::Mat4)
                .uniform(builtin::VIEW_MATRIX, UniformKind::Mat4)
                .uniform(builtin::MATERIAL_COLOR, UniformKind::Vec4)
                .uniform(builtin::MATERIAL_TEXTURE, UniformKind::Texture)
                .array(builtin::POSITION_ARRAY)
                .array(builtin::TEXCOORD_ARRAY),
            Self::Shaded => ShaderDesc::new("shaded", SHADED_WGSL, PrimitiveMode::Triangles)
                .uniform(builtin::PROJ_MATRIX, UniformKind::Mat4)
                .uniform(builtin::VIEW_MATRIX, UniformKind::Mat4)
                .uniform(builtin::MATERIAL_COLOR, UniformKind::Vec4)
                .uniform(builtin::LIGHT_COUNT, UniformKind::Int)
                .uniform(
                    builtin::LIGHTS,
                    UniformKind::Vec4Array((MAX_LIGHTS * LIGHT_STRIDE) as u32),
                )
                .array(builtin::POSITION_ARRAY)
                .array(builtin::NORMAL_ARRAY),
        }
    }

    #[inline]
    pub fn shared(self) -> Arc<ShaderDesc> {
        Arc::new(self.desc())
    }

    /// Every built-in variant, for pre-validation.
    pub fn all() -> impl Iterator<Item = ShaderKind> {
        const MODES: [PrimitiveMode; 3] =
            [PrimitiveMode::Points, PrimitiveMode::Lines, PrimitiveMode::Triangles];
        MODES
            .into_iter()
            .flat_map(|m| [Self::FlatColor(m), Self::VertexColor(m)])
            .chain([Self::Textured, Self::Shaded])
    }
}
