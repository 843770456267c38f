use std::sync::Arc;

use glam::Mat4;

use crate::scene::Texture;

/// Declared type of a uniform slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// Fixed-length array of `vec4<f32>`.
    Vec4Array(u32),
    /// Sampled 2D texture (bound outside the uniform block).
    Texture,
}

/// A uniform value as produced by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4(Mat4),
    Vec4Array(Vec<[f32; 4]>),
    /// `None` binds the backend's default (opaque white) texture.
    Texture(Option<Arc<Texture>>),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            Self::Bool(_) => UniformKind::Bool,
            Self::Int(_) => UniformKind::Int,
            Self::Float(_) => UniformKind::Float,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Vec4(_) => UniformKind::Vec4,
            Self::Mat4(_) => UniformKind::Mat4,
            Self::Vec4Array(v) => UniformKind::Vec4Array(v.len() as u32),
            Self::Texture(_) => UniformKind::Texture,
        }
    }

    #[inline]
    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            Self::Mat4(m) => Some(*m),
            _ => None,
        }
    }
}

impl From<Mat4> for UniformValue {
    #[inline]
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

impl From<[f32; 4]> for UniformValue {
    #[inline]
    fn from(v: [f32; 4]) -> Self {
        Self::Vec4(v)
    }
}

impl From<f32> for UniformValue {
    #[inline]
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for UniformValue {
    #[inline]
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for UniformValue {
    #[inline]
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
