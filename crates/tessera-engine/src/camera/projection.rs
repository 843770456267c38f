use glam::Mat4;

/// A view/projection pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub proj: Mat4,
}

impl CameraMatrices {
    pub const IDENTITY: Self = Self {
        view: Mat4::IDENTITY,
        proj: Mat4::IDENTITY,
    };

    #[inline]
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }
}

impl Default for CameraMatrices {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Orthographic projection over a `width` x `height` pixel area.
///
/// Origin at the top-left, y pointing down: (0, 0) maps to clip (-1, 1) and
/// (width, height) to clip (1, -1).
pub fn screen_ortho(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width, height, 0.0, -1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn screen_corners_map_to_clip_corners() {
        let m = screen_ortho(800.0, 600.0);
        let tl = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let br = m * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert!(tl.truncate().abs_diff_eq(Vec3::new(-1.0, 1.0, tl.z), 1e-6));
        assert!(br.truncate().abs_diff_eq(Vec3::new(1.0, -1.0, br.z), 1e-6));
    }

    #[test]
    fn screen_depth_stays_in_clip_range() {
        let m = screen_ortho(100.0, 100.0);
        let p = m * Vec4::new(50.0, 50.0, 0.0, 1.0);
        assert!((0.0..=1.0).contains(&p.z));
    }
}
