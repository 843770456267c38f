use crate::attribute::{UniformKind, UniformValue};
use crate::error::ConfigError;

use super::ShaderDesc;

/// Largest uniform block a shader may declare, in bytes.
pub const MAX_UNIFORM_BLOCK_SIZE: u32 = 1024;

/// Where a declared uniform lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformSlot {
    /// Byte range inside the uniform block.
    Block { offset: u32, size: u32 },
    /// Bound through the texture group.
    Texture,
}

/// Byte layout of a shader's uniform block, following WGSL uniform
/// address-space alignment rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlockLayout {
    slots: Vec<UniformSlot>,
    size: u32,
}

/// (alignment, size) in bytes of a block member.
fn align_and_size(kind: UniformKind) -> Option<(u32, u32)> {
    match kind {
        UniformKind::Bool | UniformKind::Int | UniformKind::Float => Some((4, 4)),
        UniformKind::Vec2 => Some((8, 8)),
        UniformKind::Vec3 => Some((16, 12)),
        UniformKind::Vec4 => Some((16, 16)),
        UniformKind::Mat4 => Some((16, 64)),
        UniformKind::Vec4Array(n) => Some((16, 16 * n)),
        UniformKind::Texture => None,
    }
}

#[inline]
const fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

impl UniformBlockLayout {
    pub fn new(desc: &ShaderDesc) -> Result<Self, ConfigError> {
        let mut slots = Vec::with_capacity(desc.uniforms.len());
        let mut cursor = 0u32;
        let mut textures = 0usize;

        for spec in &desc.uniforms {
            match align_and_size(spec.kind) {
                Some((align, size)) => {
                    let offset = round_up(cursor, align);
                    slots.push(UniformSlot::Block { offset, size });
                    cursor = offset + size;
                }
                None => {
                    textures += 1;
                    slots.push(UniformSlot::Texture);
                }
            }
        }

        if textures > 1 {
            return Err(ConfigError::TooManyTextures { shader: desc.name.clone() });
        }

        // Struct size is a multiple of its largest member alignment (16 here);
        // an empty block still occupies one vec4 so the binding is never zero-sized.
        let size = round_up(cursor.max(16), 16);
        if size > MAX_UNIFORM_BLOCK_SIZE {
            return Err(ConfigError::UniformBlockTooLarge {
                shader: desc.name.clone(),
                size,
                max: MAX_UNIFORM_BLOCK_SIZE,
            });
        }

        Ok(Self { slots, size })
    }

    /// Block size in bytes.
    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn slot(&self, index: usize) -> Option<UniformSlot> {
        self.slots.get(index).copied()
    }

    #[inline]
    pub fn has_texture(&self) -> bool {
        self.slots.contains(&UniformSlot::Texture)
    }

    /// Writes `value` into `block` at the slot of uniform `index`.
    ///
    /// Texture values and out-of-range indices are ignored. Arrays shorter
    /// than the slot are zero-padded; longer ones are truncated.
    pub fn write(&self, block: &mut [u8], index: usize, value: &UniformValue) {
        let Some(UniformSlot::Block { offset, size }) = self.slot(index) else {
            return;
        };
        let start = offset as usize;
        let end = start + size as usize;
        let Some(dst) = block.get_mut(start..end) else {
            return;
        };

        match value {
            UniformValue::Bool(b) => dst.copy_from_slice(bytemuck::bytes_of(&u32::from(*b))),
            UniformValue::Int(i) => dst.copy_from_slice(bytemuck::bytes_of(i)),
            UniformValue::Float(f) => dst.copy_from_slice(bytemuck::bytes_of(f)),
            UniformValue::Vec2(v) => dst.copy_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec3(v) => dst.copy_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec4(v) => dst.copy_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Mat4(m) => dst.copy_from_slice(bytemuck::cast_slice(&m.to_cols_array())),
            UniformValue::Vec4Array(items) => {
                let src: &[u8] = bytemuck::cast_slice(items);
                let n = src.len().min(dst.len());
                dst[..n].copy_from_slice(&src[..n]);
                dst[n..].fill(0);
            }
            UniformValue::Texture(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{builtin, AttributeId};
    use crate::shader::{PrimitiveMode, ShaderKind};
    use glam::Mat4;

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn shaded_layout_matches_wgsl_struct() {
        let desc = ShaderKind::Shaded.desc();
        let layout = UniformBlockLayout::new(&desc).unwrap();
        // proj, view, color, light_count, lights
        assert_eq!(layout.slot(0), Some(UniformSlot::Block { offset: 0, size: 64 }));
        assert_eq!(layout.slot(1), Some(UniformSlot::Block { offset: 64, size: 64 }));
        assert_eq!(layout.slot(2), Some(UniformSlot::Block { offset: 128, size: 16 }));
        assert_eq!(layout.slot(3), Some(UniformSlot::Block { offset: 144, size: 4 }));
        assert_eq!(layout.slot(4), Some(UniformSlot::Block { offset: 160, size: 640 }));
        assert_eq!(layout.size(), 800);
    }

    #[test]
    fn vec3_is_aligned_to_sixteen() {
        let desc = ShaderDesc::new("t", "", PrimitiveMode::Points)
            .uniform(builtin::LIGHT_COUNT, UniformKind::Float)
            .uniform(builtin::MATERIAL_COLOR, UniformKind::Vec3)
            .uniform(builtin::LIGHTS, UniformKind::Float);
        let layout = UniformBlockLayout::new(&desc).unwrap();
        assert_eq!(layout.slot(1), Some(UniformSlot::Block { offset: 16, size: 12 }));
        // A scalar packs into the vec3's trailing padding.
        assert_eq!(layout.slot(2), Some(UniformSlot::Block { offset: 28, size: 4 }));
        assert_eq!(layout.size(), 32);
    }

    #[test]
    fn textured_layout_has_texture_slot() {
        let layout = UniformBlockLayout::new(&ShaderKind::Textured.desc()).unwrap();
        assert!(layout.has_texture());
        assert_eq!(layout.slot(3), Some(UniformSlot::Texture));
    }

    #[test]
    fn rejects_two_textures() {
        let desc = ShaderDesc::new("two", "", PrimitiveMode::Triangles)
            .uniform(builtin::MATERIAL_TEXTURE, UniformKind::Texture)
            .uniform(AttributeId::new("test.second_texture"), UniformKind::Texture);
        assert!(matches!(
            UniformBlockLayout::new(&desc),
            Err(ConfigError::TooManyTextures { .. })
        ));
    }

    #[test]
    fn rejects_oversized_block() {
        let desc = ShaderDesc::new("big", "", PrimitiveMode::Triangles)
            .uniform(builtin::LIGHTS, UniformKind::Vec4Array(65));
        assert!(matches!(
            UniformBlockLayout::new(&desc),
            Err(ConfigError::UniformBlockTooLarge { size: 1040, .. })
        ));
    }

    #[test]
    fn writes_matrix_column_major() {
        let desc = ShaderKind::FlatColor(PrimitiveMode::Lines).desc();
        let layout = UniformBlockLayout::new(&desc).unwrap();
        let mut block = vec![0u8; layout.size() as usize];
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        layout.write(&mut block, 0, &UniformValue::Mat4(m));

        let floats = floats(&block[..64]);
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn short_array_is_zero_padded() {
        let desc = ShaderKind::Shaded.desc();
        let layout = UniformBlockLayout::new(&desc).unwrap();
        let mut block = vec![0xffu8; layout.size() as usize];
        layout.write(&mut block, 4, &UniformValue::Vec4Array(vec![[1.0; 4]]));

        let floats = floats(&block[160..800]);
        assert_eq!(&floats[..4], &[1.0; 4]);
        assert!(floats[4..].iter().all(|f| *f == 0.0));
    }
}
