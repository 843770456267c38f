use crate::attribute::{builtin, AttributeId};
use crate::error::ConfigError;
use crate::scene::GeometryAttribute;
use crate::shader::ShaderDesc;

use super::ScratchArena;

/// One interleaved component group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    pub id: AttributeId,
    /// Floats per vertex, 1..=4.
    pub components: u32,
    /// Offset inside a vertex, in floats.
    pub offset: u32,
    /// Index of the source attribute in the geometry's attribute list.
    pub source: usize,
}

/// Interleaved layout derived from a shader's array specs and a geometry.
///
/// Entries follow shader declaration order; entry `i` feeds input location `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    entries: Vec<LayoutEntry>,
    stride: u32,
    vertex_count: usize,
}

fn check_components(attr: &GeometryAttribute) -> Result<(), ConfigError> {
    if !(1..=4).contains(&attr.components) {
        return Err(ConfigError::UnsupportedComponents {
            attribute: attr.id.clone(),
            components: attr.components,
        });
    }
    if attr.data.len() % attr.components as usize != 0 {
        return Err(ConfigError::RaggedAttribute {
            attribute: attr.id.clone(),
            len: attr.data.len(),
            components: attr.components,
        });
    }
    Ok(())
}

impl VertexLayout {
    /// Pairs `shader` with `attributes`.
    ///
    /// The vertex count comes from the position attribute. Every array the
    /// shader declares must be present with exactly that many elements.
    pub fn resolve(shader: &ShaderDesc, attributes: &[GeometryAttribute]) -> Result<Self, ConfigError> {
        if shader.arrays.is_empty() {
            return Err(ConfigError::NoVertexArrays { shader: shader.name.clone() });
        }

        let missing = |id: &AttributeId| ConfigError::MissingAttribute {
            shader: shader.name.clone(),
            attribute: id.clone(),
        };
        let find = |id: &AttributeId| attributes.iter().position(|a| &a.id == id);

        let position = find(&builtin::POSITION_ARRAY)
            .map(|i| &attributes[i])
            .ok_or_else(|| missing(&builtin::POSITION_ARRAY))?;
        check_components(position)?;
        let vertex_count = position.data.len() / position.components as usize;

        let mut entries = Vec::with_capacity(shader.arrays.len());
        let mut stride = 0u32;
        for spec in &shader.arrays {
            let source = find(&spec.id).ok_or_else(|| missing(&spec.id))?;
            let attr = &attributes[source];
            check_components(attr)?;

            let expected = vertex_count * attr.components as usize;
            if attr.data.len() != expected {
                return Err(ConfigError::AttributeLengthMismatch {
                    attribute: attr.id.clone(),
                    vertices: vertex_count,
                    expected,
                    actual: attr.data.len(),
                });
            }

            entries.push(LayoutEntry {
                id: spec.id.clone(),
                components: attr.components,
                offset: stride,
                source,
            });
            stride += attr.components;
        }

        Ok(Self {
            entries,
            stride,
            vertex_count,
        })
    }

    #[inline]
    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    /// Floats per vertex.
    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn stride_bytes(&self) -> u64 {
        u64::from(self.stride) * size_of::<f32>() as u64
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Total interleaved length in floats.
    #[inline]
    pub fn packed_len(&self) -> usize {
        self.vertex_count * self.stride as usize
    }

    /// Interleaves `attributes` into `scratch` and returns the packed region.
    ///
    /// `attributes` must have the shape this layout was resolved against.
    pub fn interleave<'a>(&self, attributes: &[GeometryAttribute], scratch: &'a mut ScratchArena) -> &'a [f32] {
        let stride = self.stride as usize;
        let out = scratch.region(self.packed_len());

        for entry in &self.entries {
            let comps = entry.components as usize;
            let offset = entry.offset as usize;
            let src = &attributes[entry.source].data;
            for (vertex, chunk) in src.chunks_exact(comps).take(self.vertex_count).enumerate() {
                let at = vertex * stride + offset;
                out[at..at + comps].copy_from_slice(chunk);
            }
        }
        out
    }

    /// Reads the floats of entry `index` back out of an interleaved buffer.
    pub fn extract(&self, packed: &[f32], index: usize) -> Vec<f32> {
        let Some(entry) = self.entries.get(index) else {
            return Vec::new();
        };
        let comps = entry.components as usize;
        let offset = entry.offset as usize;
        packed
            .chunks_exact(self.stride as usize)
            .flat_map(|vertex| vertex[offset..offset + comps].iter().copied())
            .collect()
    }
}
