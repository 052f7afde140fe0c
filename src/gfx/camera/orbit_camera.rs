use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera orbiting a target point, y-up.
///
/// Eye and target are the source of truth. Yaw, pitch and distance are
/// derived from `eye - target` whenever an orbit step needs them, so direct
/// eye/target edits from keyboard navigation never go stale.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            eye,
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(75.0).into(),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update_view_proj();
        camera
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).magnitude()
    }

    /// Angle around the up axis, measured from +z towards +x
    pub fn yaw(&self) -> f32 {
        let offset = self.eye - self.target;
        offset.x.atan2(offset.z)
    }

    /// Elevation of the eye above the target's horizontal plane
    pub fn pitch(&self) -> f32 {
        let offset = self.eye - self.target;
        let distance = offset.magnitude();
        if distance <= f32::EPSILON {
            0.0
        } else {
            (offset.y / distance).clamp(-1.0, 1.0).asin()
        }
    }

    /// Unit vector from eye towards target, `-z` when the two coincide
    pub fn forward(&self) -> Vector3<f32> {
        let direction = self.target - self.eye;
        if direction.magnitude2() <= f32::EPSILON {
            -Vector3::unit_z()
        } else {
            direction.normalize()
        }
    }

    pub fn set_eye(&mut self, eye: Vector3<f32>) {
        self.eye = eye;
    }

    pub fn set_target(&mut self, target: Vector3<f32>) {
        self.target = target;
    }

    /// Moves eye and target together, keeping the view direction
    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.eye += delta;
        self.target += delta;
    }

    pub fn set_distance(&mut self, distance: f32) {
        let distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.place_eye(self.pitch(), self.yaw(), distance);
    }

    pub fn add_distance(&mut self, delta: f32) {
        let distance = self.distance().max(1.0 + f32::EPSILON);
        let corrected_zoom = f32::log10(distance) * delta;
        self.set_distance(self.distance() + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        let pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.place_eye(pitch, self.yaw(), self.distance());
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch() + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.max(min_yaw);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.min(max_yaw);
        }
        self.place_eye(self.pitch(), bounded_yaw, self.distance());
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw() + delta);
    }

    /// Pans eye and target in the view plane.
    /// delta.0 = horizontal, delta.1 = vertical, both scaled by distance.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = self.forward();
        let right = forward.cross(self.safe_up(forward)).normalize();
        let up = right.cross(forward).normalize();

        let pan_scale = self.distance().max(1.0) * 0.1;
        self.translate(right * delta.0 * pan_scale + up * delta.1 * pan_scale);
    }

    fn place_eye(&mut self, pitch: f32, yaw: f32, distance: f32) {
        self.eye = calculate_cartesian_eye_position(pitch, yaw, distance, self.target);
    }

    // `up` is unusable when looking straight along it
    fn safe_up(&self, forward: Vector3<f32>) -> Vector3<f32> {
        if forward.cross(self.up).magnitude2() <= 1e-8 {
            Vector3::unit_z()
        } else {
            self.up
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let forward = self.forward();
        let eye = Point3::from_vec(self.eye);
        Matrix4::look_to_rh(eye, forward, self.safe_up(forward))
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(0.5),
            max_distance: Some(500.0),
            min_pitch: -std::f32::consts::FRAC_PI_2 + 0.01,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.01,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn test_translate_keeps_view_vector() {
        let mut camera = OrbitCamera::new(Vector3::new(10.0, 10.0, -10.0), Vector3::zero(), 1.5);
        let before = camera.target - camera.eye;
        camera.translate(Vector3::new(0.0, 1.0, 0.0));
        assert!(close(camera.target - camera.eye, before));
        assert!(close(camera.eye, Vector3::new(10.0, 11.0, -10.0)));
    }

    #[test]
    fn test_orbit_preserves_distance_and_target() {
        let mut camera = OrbitCamera::new(Vector3::new(10.0, 10.0, -10.0), Vector3::zero(), 1.5);
        let distance = camera.distance();
        camera.add_yaw(0.3);
        camera.add_pitch(-0.1);
        assert!((camera.distance() - distance).abs() < 1e-3);
        assert!(close(camera.target, Vector3::zero()));
    }

    #[test]
    fn test_derived_angles_round_trip() {
        let camera = OrbitCamera::new(Vector3::new(0.0, 0.0, 5.0), Vector3::zero(), 1.0);
        assert!(camera.yaw().abs() < 1e-6);
        assert!(camera.pitch().abs() < 1e-6);
        assert!((camera.distance() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_view_is_finite() {
        let camera = OrbitCamera::new(Vector3::zero(), Vector3::zero(), 1.0);
        let matrix = camera.build_view_projection_matrix();
        for col in 0..4 {
            for row in 0..4 {
                assert!(matrix[col][row].is_finite());
            }
        }
        assert!(close(camera.forward(), -Vector3::unit_z()));
    }
}
