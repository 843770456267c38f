use glam::{Mat3, Mat4, Vec3};

use crate::attribute::{builtin, AttributeId};
use crate::shader::PrimitiveMode;

/// A named flat float array with a fixed component count.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryAttribute {
    pub id: AttributeId,
    pub components: u32,
    pub data: Vec<f32>,
}

/// Axis-aligned bounds in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Vertex data for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    mode: PrimitiveMode,
    attributes: Vec<GeometryAttribute>,
}

impl Geometry {
    pub fn new(mode: PrimitiveMode) -> Self {
        Self {
            mode,
            attributes: Vec::new(),
        }
    }

    /// Triangle list from 3-component positions.
    pub fn triangles(positions: Vec<f32>) -> Self {
        Self::new(PrimitiveMode::Triangles).with_attribute(builtin::POSITION_ARRAY, 3, positions)
    }

    /// Line list from 3-component positions.
    pub fn lines(positions: Vec<f32>) -> Self {
        Self::new(PrimitiveMode::Lines).with_attribute(builtin::POSITION_ARRAY, 3, positions)
    }

    pub fn with_attribute(mut self, id: AttributeId, components: u32, data: Vec<f32>) -> Self {
        self.set_attribute(id, components, data);
        self
    }

    /// Adds or replaces the attribute named `id`.
    pub fn set_attribute(&mut self, id: AttributeId, components: u32, data: Vec<f32>) {
        match self.attributes.iter_mut().find(|a| a.id == id) {
            Some(existing) => {
                existing.components = components;
                existing.data = data;
            }
            None => self.attributes.push(GeometryAttribute { id, components, data }),
        }
    }

    #[inline]
    pub fn mode(&self) -> PrimitiveMode {
        self.mode
    }

    #[inline]
    pub fn attributes(&self) -> &[GeometryAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, id: &AttributeId) -> Option<&GeometryAttribute> {
        self.attributes.iter().find(|a| &a.id == id)
    }

    /// Vertex count implied by the position attribute; 0 without one.
    pub fn vertex_count(&self) -> usize {
        self.attribute(&builtin::POSITION_ARRAY)
            .filter(|a| a.components > 0)
            .map_or(0, |a| a.data.len() / a.components as usize)
    }

    /// Bounds of the 2- or 3-component positions.
    pub fn bounds(&self) -> Option<Bounds> {
        let pos = self.attribute(&builtin::POSITION_ARRAY)?;
        let comps = pos.components as usize;
        if !(2..=3).contains(&comps) {
            return None;
        }
        let mut points = pos.data.chunks_exact(comps).map(|c| {
            Vec3::new(c[0], c[1], if comps == 3 { c[2] } else { 0.0 })
        });
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Bounds { min, max })
    }

    /// Attributes with `transform` applied: positions as points, normals by
    /// the inverse transpose (renormalized). Everything else is copied.
    pub fn transformed(&self, transform: &Mat4) -> Vec<GeometryAttribute> {
        if *transform == Mat4::IDENTITY {
            return self.attributes.clone();
        }
        let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

        self.attributes
            .iter()
            .map(|attr| {
                let data = if attr.id == builtin::POSITION_ARRAY {
                    transform_points(transform, attr)
                } else if attr.id == builtin::NORMAL_ARRAY && attr.components == 3 {
                    attr.data
                        .chunks_exact(3)
                        .flat_map(|n| {
                            (normal_matrix * Vec3::new(n[0], n[1], n[2]))
                                .normalize_or_zero()
                                .to_array()
                        })
                        .collect()
                } else {
                    attr.data.clone()
                };
                GeometryAttribute {
                    id: attr.id.clone(),
                    components: attr.components,
                    data,
                }
            })
            .collect()
    }
}

fn transform_points(transform: &Mat4, attr: &GeometryAttribute) -> Vec<f32> {
    match attr.components {
        2 => attr
            .data
            .chunks_exact(2)
            .flat_map(|p| {
                let t = transform.transform_point3(Vec3::new(p[0], p[1], 0.0));
                [t.x, t.y]
            })
            .collect(),
        3 => attr
            .data
            .chunks_exact(3)
            .flat_map(|p| transform.transform_point3(Vec3::new(p[0], p[1], p[2])).to_array())
            .collect(),
        4 => attr
            .data
            .chunks_exact(4)
            .flat_map(|p| (*transform * glam::Vec4::new(p[0], p[1], p[2], p[3])).to_array())
            .collect(),
        _ => attr.data.clone(),
    }
}
