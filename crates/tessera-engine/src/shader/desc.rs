use std::borrow::Cow;

use crate::attribute::{AttributeId, UniformKind};

/// Primitive topology a shader draws with. Fixed per shader.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    Points,
    Lines,
    Triangles,
}

impl PrimitiveMode {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::Triangles => "triangles",
        }
    }

    #[inline]
    pub const fn is_triangles(self) -> bool {
        matches!(self, Self::Triangles)
    }
}

/// A uniform the shader consumes, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSpec {
    pub id: AttributeId,
    pub kind: UniformKind,
}

/// A per-vertex array the shader consumes. The declaration index is the
/// shader input location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySpec {
    pub id: AttributeId,
}

/// Complete description of a shader program.
///
/// WGSL contract:
/// - uniforms other than textures form one struct at `@group(0) @binding(0)`,
///   fields in declaration order
/// - a texture uniform binds `texture_2d<f32>` at `@group(1) @binding(0)`
///   and a filtering sampler at `@group(1) @binding(1)`
/// - vertex array `i` is `@location(i)`
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDesc {
    pub name: String,
    pub wgsl: Cow<'static, str>,
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub mode: PrimitiveMode,
    pub uniforms: Vec<UniformSpec>,
    pub arrays: Vec<ArraySpec>,
}

impl ShaderDesc {
    pub fn new(name: impl Into<String>, wgsl: impl Into<Cow<'static, str>>, mode: PrimitiveMode) -> Self {
        Self {
            name: name.into(),
            wgsl: wgsl.into(),
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
            mode,
            uniforms: Vec::new(),
            arrays: Vec::new(),
        }
    }

    pub fn with_entry_points(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_entry = vertex.into();
        self.fragment_entry = fragment.into();
        self
    }

    pub fn uniform(mut self, id: AttributeId, kind: UniformKind) -> Self {
        self.uniforms.push(UniformSpec { id, kind });
        self
    }

    pub fn array(mut self, id: AttributeId) -> Self {
        self.arrays.push(ArraySpec { id });
        self
    }

    /// Index and spec of the texture uniform, if the shader declares one.
    pub fn texture_uniform(&self) -> Option<(usize, &UniformSpec)> {
        self.uniforms
            .iter()
            .enumerate()
            .find(|(_, u)| u.kind == UniformKind::Texture)
    }
}
