use glam::{Mat3, Mat4, Vec3};

use crate::scene::Bounds;

use super::CameraMatrices;

/// Closest the camera may orbit to its target.
pub const MIN_ZOOM: f32 = 0.02;

/// Orbit camera around a target point. Z is up.
///
/// At azimuth 0 and elevation 0 the camera sits on the -Y side of the target
/// looking along +Y. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub target: Vec3,
    pub distance: f32,
    pub azimuth: f32,
    /// Clamped to [0, 90].
    pub elevation: f32,
    /// Vertical field of view.
    pub fov: f32,
    pub near: f32,
    /// May be `f32::INFINITY`.
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.0,
            fov: 45.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new(fov: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            near,
            far,
            ..Self::default()
        }
    }

    /// Multiplies the distance by `factor`. Rejected (returns `false`) if the
    /// result would fall below [`MIN_ZOOM`].
    pub fn zoom(&mut self, factor: f32) -> bool {
        let distance = self.distance * factor;
        if distance.is_nan() || distance < MIN_ZOOM {
            return false;
        }
        self.distance = distance;
        true
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.max(MIN_ZOOM);
    }

    pub fn turn_azimuth(&mut self, degrees: f32) {
        self.set_azimuth(self.azimuth + degrees);
    }

    pub fn set_azimuth(&mut self, degrees: f32) {
        self.azimuth = degrees.rem_euclid(360.0);
    }

    /// Positive values raise the camera.
    pub fn turn_elevation(&mut self, degrees: f32) {
        self.set_elevation(self.elevation + degrees);
    }

    pub fn set_elevation(&mut self, degrees: f32) {
        self.elevation = degrees.clamp(0.0, 90.0);
    }

    /// Moves the target by `delta`. With `local`, x/y are taken relative to
    /// the current azimuth so "forward" follows the view direction.
    pub fn move_target(&mut self, delta: Vec3, local: bool) {
        let delta = if local {
            Mat3::from_rotation_z(self.azimuth.to_radians()) * delta
        } else {
            delta
        };
        self.target += delta;
    }

    /// Centers on `bounds` and backs off until the box fits the field of view.
    pub fn frame(&mut self, bounds: &Bounds) {
        let extent = bounds.extent().max_element();
        let half_fov = (self.fov * 0.5).to_radians();
        self.target = bounds.center();
        self.set_distance(0.5 * 1.5 * extent / half_fov.tan());
    }

    /// Camera position in world space.
    pub fn eye(&self) -> Vec3 {
        let (sa, ca) = self.azimuth.to_radians().sin_cos();
        let (se, ce) = self.elevation.to_radians().sin_cos();
        self.target + self.distance * Vec3::new(ce * sa, -ce * ca, se)
    }

    /// Camera up vector; stays well defined at elevation 90.
    fn up(&self) -> Vec3 {
        let (sa, ca) = self.azimuth.to_radians().sin_cos();
        let (se, ce) = self.elevation.to_radians().sin_cos();
        Vec3::new(-sa * se, ca * se, ce)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, self.up())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let fov = self.fov.to_radians();
        if self.far.is_finite() {
            Mat4::perspective_rh(fov, aspect, self.near, self.far)
        } else {
            Mat4::perspective_infinite_rh(fov, aspect, self.near)
        }
    }

    pub fn matrices(&self, aspect: f32) -> CameraMatrices {
        CameraMatrices {
            view: self.view_matrix(),
            proj: self.projection_matrix(aspect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── orbit ─────────────────────────────────────────────────────────────

    #[test]
    fn default_eye_is_on_negative_y() {
        let cam = Camera::default();
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, -5.0, 0.0), 1e-5));
    }

    #[test]
    fn azimuth_rotates_around_z() {
        let mut cam = Camera::default();
        cam.turn_azimuth(90.0);
        assert!(cam.eye().abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-5));
        cam.turn_azimuth(-180.0);
        assert_eq!(cam.azimuth, 270.0);
    }

    #[test]
    fn elevation_is_clamped() {
        let mut cam = Camera::default();
        cam.turn_elevation(120.0);
        assert_eq!(cam.elevation, 90.0);
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-5));
        cam.set_elevation(-10.0);
        assert_eq!(cam.elevation, 0.0);
    }

    #[test]
    fn view_is_finite_looking_straight_down() {
        let mut cam = Camera::default();
        cam.set_elevation(90.0);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn view_maps_target_onto_negative_z_axis() {
        let mut cam = Camera::default();
        cam.set_elevation(30.0);
        cam.set_azimuth(40.0);
        let p = cam.view_matrix().transform_point3(cam.target);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -5.0), 1e-4));
    }

    // ── zoom ──────────────────────────────────────────────────────────────

    #[test]
    fn zoom_below_minimum_is_rejected() {
        let mut cam = Camera::default();
        assert!(cam.zoom(0.5));
        assert_eq!(cam.distance, 2.5);
        assert!(!cam.zoom(0.001));
        assert_eq!(cam.distance, 2.5);
    }

    #[test]
    fn set_distance_clamps_to_minimum() {
        let mut cam = Camera::default();
        cam.set_distance(0.0);
        assert_eq!(cam.distance, MIN_ZOOM);
    }

    // ── target ────────────────────────────────────────────────────────────

    #[test]
    fn local_move_follows_azimuth() {
        let mut cam = Camera::default();
        cam.set_azimuth(90.0);
        cam.move_target(Vec3::X, true);
        assert!(cam.target.abs_diff_eq(Vec3::Y, 1e-5));
        cam.move_target(Vec3::X, false);
        assert!(cam.target.abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-5));
    }

    #[test]
    fn frame_fits_bounds() {
        let mut cam = Camera::new(90.0, 0.1, 100.0);
        cam.frame(&Bounds {
            min: Vec3::new(-1.0, -2.0, 0.0),
            max: Vec3::new(1.0, 2.0, 1.0),
        });
        assert!(cam.target.abs_diff_eq(Vec3::new(0.0, 0.0, 0.5), 1e-6));
        // 0.5 * 1.5 * 4 / tan(45°)
        assert!((cam.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn infinite_far_uses_infinite_projection() {
        let cam = Camera::new(60.0, 0.1, f32::INFINITY);
        assert!(cam.projection_matrix(1.5).is_finite());
    }
}
