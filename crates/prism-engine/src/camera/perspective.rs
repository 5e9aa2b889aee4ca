use glam::{Mat4, Vec3};

/// Perspective camera with cached projection and view matrices.
///
/// Projection parameters are plain fields; call [`update_projection`] after
/// changing them. [`set_aspect`] does not recompute on its own so that several
/// parameters can be changed before a single update.
///
/// [`update_projection`]: PerspectiveCamera::update_projection
/// [`set_aspect`]: PerspectiveCamera::set_aspect
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,

    projection: Mat4,
    view: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_y_degrees,
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 1.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        };
        camera.update_projection();
        camera.update_view();
        camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        } else {
            log::warn!("ignoring invalid camera aspect {aspect}");
        }
    }

    /// Places the camera at `position` looking at `target`.
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
        self.update_view();
    }

    /// Recomputes the projection matrix from fov/aspect/near/far.
    pub fn update_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn update_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.target, self.up);
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for PerspectiveCamera {
    /// 75° vertical fov, near 1, far 100, at (0, 1, -3) looking at the origin.
    fn default() -> Self {
        let mut camera = Self::new(75.0, 1.0, 1.0, 100.0);
        camera.look_at(Vec3::new(0.0, 1.0, -3.0), Vec3::ZERO);
        camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_change_applies_after_update() {
        let mut camera = PerspectiveCamera::default();
        let before = camera.projection();

        camera.set_aspect(2.0);
        assert_eq!(camera.projection(), before);

        camera.update_projection();
        assert_ne!(camera.projection(), before);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn invalid_aspect_is_ignored() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(1.5);
        camera.set_aspect(f32::NAN);
        camera.set_aspect(0.0);
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn projection_matches_glam_perspective() {
        let camera = PerspectiveCamera::new(60.0, 16.0 / 9.0, 0.1, 50.0);
        let expected = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 50.0);
        assert_eq!(camera.projection(), expected);
    }

    #[test]
    fn default_camera_looks_at_origin() {
        let camera = PerspectiveCamera::default();
        let origin_in_view = camera.view().transform_point3(Vec3::ZERO);
        // Right-handed view space: the target lies on -Z.
        assert!(origin_in_view.z < 0.0);
        assert!(origin_in_view.x.abs() < 1e-5);
        assert!(origin_in_view.y.abs() < 1e-5);
    }
}
