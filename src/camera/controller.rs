use glam::{Mat3, Quat, Vec2, Vec3};

use super::core::Camera;
use crate::options::CameraOptions;

/// Base rotation in radians per pixel of drag, scaled by `rotate_speed`.
const ROTATE_SCALE: f32 = 0.01;
/// Base pan in world units per pixel of drag, scaled by `pan_speed`.
const PAN_SCALE: f32 = 0.2;

/// Orbit camera: rotates around, pans and zooms toward a focus point.
#[derive(Debug, Clone)]
pub struct OrbitController {
    orientation: Quat,
    distance: f32,
    focus_point: Vec3,
    camera: Camera,
    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl OrbitController {
    /// Controller placed per `options`, looking from `eye` at `target`.
    #[must_use]
    pub fn new(options: &CameraOptions, aspect: f32) -> Self {
        let eye = Vec3::from_array(options.eye);
        let focus_point = Vec3::from_array(options.target);
        let offset = eye - focus_point;
        let distance = offset.length().max(1.0);
        let orientation = look_orientation(offset.normalize_or(Vec3::Z));

        let camera = Camera {
            eye,
            target: focus_point,
            up: Vec3::Y,
            aspect,
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        };

        let mut controller = Self {
            orientation,
            distance,
            focus_point,
            camera,
            rotate_speed: options.rotate_speed * ROTATE_SCALE,
            pan_speed: options.pan_speed * PAN_SCALE,
            zoom_speed: options.zoom_speed,
        };
        controller.update_camera_pos();
        controller
    }

    fn update_camera_pos(&mut self) {
        let dir = self.orientation * Vec3::Z;

        self.camera.eye = self.focus_point + (dir * self.distance);
        self.camera.target = self.focus_point;
        self.camera.up = self.orientation * Vec3::Y;
    }

    /// The camera in its current pose.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Distance from the eye to the focus point.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Update the aspect ratio after a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.aspect = width as f32 / height as f32;
        }
    }

    /// Orbit by a mouse drag `delta` in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        // Horizontal rotation around camera's up vector
        let up = self.orientation * Vec3::Y;
        let horizontal_rotation =
            Quat::from_axis_angle(up, -delta.x * self.rotate_speed);
        self.orientation = horizontal_rotation * self.orientation;

        // Vertical rotation around camera's right vector (after horizontal rotation)
        let right = self.orientation * Vec3::X;
        let vertical_rotation =
            Quat::from_axis_angle(right, -delta.y * self.rotate_speed);
        self.orientation = (vertical_rotation * self.orientation).normalize();

        self.update_camera_pos();
    }

    /// Slide the focus point in the view plane by a drag `delta` in pixels.
    pub fn pan(&mut self, delta: Vec2) {
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;

        let translation = right * (-delta.x * self.pan_speed)
            + up * (delta.y * self.pan_speed);

        self.focus_point += translation;
        self.update_camera_pos();
    }

    /// Move toward (positive) or away from the focus point.
    pub fn zoom(&mut self, delta: f32) {
        self.distance *= 1.0 - delta * self.zoom_speed;
        self.distance = self.distance.clamp(1.0, self.camera.zfar * 0.5);
        self.update_camera_pos();
    }
}

/// Rotation taking +Z to `dir` while keeping +Y as close to world up as
/// possible.
fn look_orientation(dir: Vec3) -> Quat {
    let right = Vec3::Y.cross(dir).try_normalize().unwrap_or(Vec3::X);
    let up = dir.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, dir)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> OrbitController {
        OrbitController::new(&CameraOptions::default(), 1.5)
    }

    #[test]
    fn starts_at_configured_eye() {
        let options = CameraOptions::default();
        let c = controller();
        let eye = Vec3::from_array(options.eye);
        assert!((c.camera().eye - eye).length() < 1e-3, "{:?}", c.camera().eye);
        assert_eq!(c.camera().target, Vec3::ZERO);
        assert!(c.camera().up.y > 0.0);
    }

    #[test]
    fn rotate_keeps_distance_and_moves_eye() {
        let mut c = controller();
        let before = c.camera().matrices();
        c.rotate(Vec2::new(30.0, -10.0));
        let after = c.camera().matrices();
        assert_ne!(before, after);
        let dist = (c.camera().eye - c.camera().target).length();
        assert!((dist - c.distance()).abs() < 1e-3);
    }

    #[test]
    fn pan_moves_target() {
        let mut c = controller();
        c.pan(Vec2::new(10.0, 0.0));
        assert_ne!(c.camera().target, Vec3::ZERO);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut c = controller();
        for _ in 0..200 {
            c.zoom(5.0);
        }
        assert_eq!(c.distance(), 1.0);
        for _ in 0..200 {
            c.zoom(-5.0);
        }
        assert_eq!(c.distance(), c.camera().zfar * 0.5);
    }

    #[test]
    fn resize_updates_aspect_and_ignores_zero() {
        let mut c = controller();
        c.resize(1000, 500);
        assert_eq!(c.camera().aspect, 2.0);
        c.resize(0, 500);
        assert_eq!(c.camera().aspect, 2.0);
    }
}
