use thiserror::Error;

use crate::attribute::{AttributeId, UniformKind};
use crate::backend::BackendError;

/// Construction-time configuration error.
///
/// These are detected when a shader is paired with a geometry or with its
/// uniform providers. They are never recovered from: the pairing is rejected
/// and nothing is uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("shader `{shader}` does not declare any vertex arrays")]
    NoVertexArrays { shader: String },

    #[error("shader `{shader}` requires vertex attribute `{attribute}`, which the geometry lacks")]
    MissingAttribute { shader: String, attribute: AttributeId },

    #[error("attribute `{attribute}` has {actual} floats, expected {expected} ({vertices} vertices)")]
    AttributeLengthMismatch {
        attribute: AttributeId,
        vertices: usize,
        expected: usize,
        actual: usize,
    },

    #[error("attribute `{attribute}` has {len} floats, not a multiple of {components} components")]
    RaggedAttribute {
        attribute: AttributeId,
        len: usize,
        components: u32,
    },

    #[error("attribute `{attribute}` has {components} components; only 1..=4 are supported")]
    UnsupportedComponents { attribute: AttributeId, components: u32 },

    #[error("shader `{shader}` requires uniform `{uniform}`, but no provider is registered")]
    MissingUniform { shader: String, uniform: AttributeId },

    #[error("uniform `{uniform}` expects {expected:?}, provider returned {actual:?}")]
    UniformKindMismatch {
        uniform: AttributeId,
        expected: UniformKind,
        actual: UniformKind,
    },

    #[error("uniform block of shader `{shader}` is {size} bytes; at most {max} are supported")]
    UniformBlockTooLarge { shader: String, size: u32, max: u32 },

    #[error("shader `{shader}` declares more than one texture uniform")]
    TooManyTextures { shader: String },

    #[error("texture of {width}x{height} needs {expected} RGBA bytes, got {actual}")]
    TextureSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Any failure on the render path.
///
/// Every variant is fatal for the frame and for the renderer: there is no
/// degraded fallback and no retry. Callers are expected to stop rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
