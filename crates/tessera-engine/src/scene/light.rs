use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

use crate::attribute::{builtin, AttributeRegistry, ProvideAttributes, UniformValue};
use crate::sync::Generation;

/// Lights the shaded shader can consume; extras are ignored.
pub const MAX_LIGHTS: usize = 8;

/// `vec4` slots per packed light.
pub const LIGHT_STRIDE: usize = 5;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LightKind {
    Off,
    Directional,
    Point,
    Spot,
}

impl LightKind {
    fn code(self) -> f32 {
        match self {
            Self::Off => 0.0,
            Self::Directional => 1.0,
            Self::Point => 2.0,
            Self::Spot => 3.0,
        }
    }
}

/// A light source. Colors are linear RGB.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    /// Position, or the direction towards the light for directional lights.
    pub position: Vec3,
    pub ambient: [f32; 3],
    pub color: [f32; 3],
    /// Attenuation range; 0 is unbounded.
    pub range: f32,
    pub spot_direction: Vec3,
    pub spot_cos_cutoff: f32,
    pub spot_exponent: f32,
}

impl Light {
    pub fn directional(direction: Vec3, ambient: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            kind: LightKind::Directional,
            position: direction,
            ambient,
            color,
            range: 0.0,
            spot_direction: Vec3::NEG_Z,
            spot_cos_cutoff: 0.0,
            spot_exponent: 0.0,
        }
    }

    pub fn point(position: Vec3, ambient: [f32; 3], color: [f32; 3], range: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            range,
            ..Self::directional(Vec3::Z, ambient, color)
        }
    }

    /// Spot light with a cone of `angle` degrees; `softness` in [0, 1]
    /// sharpens the falloff towards the cone edge.
    pub fn spot(
        position: Vec3,
        ambient: [f32; 3],
        color: [f32; 3],
        range: f32,
        direction: Vec3,
        angle: f32,
        softness: f32,
    ) -> Self {
        Self {
            kind: LightKind::Spot,
            spot_direction: direction,
            spot_cos_cutoff: angle.to_radians().cos(),
            spot_exponent: 100.0 * softness,
            ..Self::point(position, ambient, color, range)
        }
    }

    /// Moves the light, keeping everything else.
    pub fn with_position(self, position: Vec3) -> Self {
        Self { position, ..self }
    }

    /// Packs the light into [`LIGHT_STRIDE`] `vec4`s as the shaded shader reads them.
    pub fn pack(&self) -> [[f32; 4]; LIGHT_STRIDE] {
        let position = match self.kind {
            LightKind::Directional => self.position.normalize_or_zero().extend(0.0),
            _ => self.position.extend(1.0),
        };
        let [ar, ag, ab] = self.ambient;
        let [cr, cg, cb] = self.color;
        let d = self.spot_direction;
        [
            position.to_array(),
            [ar, ag, ab, self.range],
            [cr, cg, cb, self.kind.code()],
            [d.x, d.y, d.z, self.spot_cos_cutoff],
            [self.spot_exponent, 0.0, 0.0, 0.0],
        ]
    }
}

#[derive(Debug, Default)]
struct LightSetInner {
    lights: RwLock<Vec<Light>>,
    generation: Generation,
    overflow_warned: AtomicBool,
}

/// Shared, cheaply cloneable list of scene lights.
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    inner: Arc<LightSetInner>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a light and returns its index.
    pub fn add(&self, light: Light) -> usize {
        let mut lights = self.inner.lights.write();
        lights.push(light);
        self.inner.generation.bump();
        lights.len() - 1
    }

    /// Replaces the light at `index`. Returns `false` if out of range.
    pub fn set(&self, index: usize, light: Light) -> bool {
        let mut lights = self.inner.lights.write();
        match lights.get_mut(index) {
            Some(slot) => {
                *slot = light;
                self.inner.generation.bump();
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, index: usize) -> Option<Light> {
        let mut lights = self.inner.lights.write();
        if index >= lights.len() {
            return None;
        }
        let light = lights.remove(index);
        self.inner.generation.bump();
        Some(light)
    }

    pub fn clear(&self) {
        self.inner.lights.write().clear();
        self.inner.generation.bump();
    }

    pub fn len(&self) -> usize {
        self.inner.lights.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lights.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Light> {
        self.inner.lights.read().get(index).copied()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.inner.generation.current()
    }

    /// Light count and the packed array, zero-padded to [`MAX_LIGHTS`] entries.
    pub fn packed(&self) -> (i32, Vec<[f32; 4]>) {
        let lights = self.inner.lights.read();
        if lights.len() > MAX_LIGHTS && !self.inner.overflow_warned.swap(true, Ordering::Relaxed) {
            log::warn!(
                "{} lights in scene; only the first {MAX_LIGHTS} are used",
                lights.len()
            );
        }

        let mut packed = vec![[0.0; 4]; MAX_LIGHTS * LIGHT_STRIDE];
        let used = lights.len().min(MAX_LIGHTS);
        for (slot, light) in packed.chunks_exact_mut(LIGHT_STRIDE).zip(lights.iter()) {
            slot.copy_from_slice(&light.pack());
        }
        (used as i32, packed)
    }
}

impl ProvideAttributes for LightSet {
    fn provide_attributes(&self, dst: &mut AttributeRegistry) {
        let count = self.clone();
        dst.register(builtin::LIGHT_COUNT, move || UniformValue::Int(count.packed().0));
        let lights = self.clone();
        dst.register(builtin::LIGHTS, move || UniformValue::Vec4Array(lights.packed().1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 3] = [1.0; 3];
    const DARK: [f32; 3] = [0.1; 3];

    #[test]
    fn directional_is_normalized_with_zero_w() {
        let p = Light::directional(Vec3::new(0.0, 3.0, 4.0), DARK, WHITE).pack();
        let position = glam::Vec4::from_array(p[0]);
        assert!(position.abs_diff_eq(glam::Vec4::new(0.0, 0.6, 0.8, 0.0), 1e-6));
        assert_eq!(p[2][3], 1.0);
    }

    #[test]
    fn spot_packs_cutoff_and_exponent() {
        let p = Light::spot(Vec3::ONE, DARK, WHITE, 10.0, Vec3::NEG_Z, 60.0, 0.5).pack();
        assert_eq!(p[0], [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(p[1][3], 10.0);
        assert!((p[3][3] - 0.5).abs() < 1e-6);
        assert_eq!(p[4][0], 50.0);
        assert_eq!(p[2][3], 3.0);
    }

    #[test]
    fn packed_is_padded_and_truncated() {
        let set = LightSet::new();
        set.add(Light::point(Vec3::ZERO, DARK, WHITE, 0.0));
        let (count, packed) = set.packed();
        assert_eq!(count, 1);
        assert_eq!(packed.len(), MAX_LIGHTS * LIGHT_STRIDE);

        for _ in 0..10 {
            set.add(Light::point(Vec3::X, DARK, WHITE, 0.0));
        }
        let (count, packed) = set.packed();
        assert_eq!(count, MAX_LIGHTS as i32);
        assert_eq!(packed.len(), MAX_LIGHTS * LIGHT_STRIDE);
    }

    #[test]
    fn mutations_bump_generation() {
        let set = LightSet::new();
        let g0 = set.generation();
        let i = set.add(Light::point(Vec3::ZERO, DARK, WHITE, 0.0));
        assert!(set.set(i, Light::point(Vec3::X, DARK, WHITE, 0.0)));
        assert!(!set.set(5, Light::point(Vec3::X, DARK, WHITE, 0.0)));
        assert!(set.remove(0).is_some());
        assert_eq!(set.generation(), g0 + 3);
    }

    #[test]
    fn provides_count_and_array() {
        let set = LightSet::new();
        let mut reg = AttributeRegistry::new();
        set.provide_attributes(&mut reg);

        assert_eq!(reg.evaluate(&builtin::LIGHT_COUNT), Some(UniformValue::Int(0)));
        set.add(Light::directional(Vec3::Z, DARK, WHITE));
        assert_eq!(reg.evaluate(&builtin::LIGHT_COUNT), Some(UniformValue::Int(1)));
    }
}
