//! Ids of the attributes the engine itself provides or consumes.

use super::AttributeId;

// ── uniforms ──────────────────────────────────────────────────────────────

pub const PROJ_MATRIX: AttributeId = AttributeId::from_static("builtin.proj_matrix");
pub const VIEW_MATRIX: AttributeId = AttributeId::from_static("builtin.view_matrix");

pub const LIGHT_COUNT: AttributeId = AttributeId::from_static("builtin.light_count");
pub const LIGHTS: AttributeId = AttributeId::from_static("builtin.lights");

pub const MATERIAL_COLOR: AttributeId = AttributeId::from_static("builtin.material.color");
pub const MATERIAL_TEXTURE: AttributeId = AttributeId::from_static("builtin.material.texture");

// ── vertex arrays ─────────────────────────────────────────────────────────

pub const POSITION_ARRAY: AttributeId = AttributeId::from_static("builtin.position");
pub const NORMAL_ARRAY: AttributeId = AttributeId::from_static("builtin.normal");
pub const COLOR_ARRAY: AttributeId = AttributeId::from_static("builtin.color");
pub const TEXCOORD_ARRAY: AttributeId = AttributeId::from_static("builtin.texcoord");
