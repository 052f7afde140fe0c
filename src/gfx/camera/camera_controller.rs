use winit::{dpi::PhysicalPosition, event::MouseScrollDelta};

use super::orbit_camera::OrbitCamera;

/// A single orbit gesture, already reduced from raw input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitInput {
    /// Pointer motion in physical pixels while rotating
    Rotate { dx: f32, dy: f32 },
    /// Pointer motion in physical pixels while panning
    Pan { dx: f32, dy: f32 },
    /// Scroll amount, positive zooms out
    Zoom(f32),
}

/// Mouse orbit controls with an enable switch.
///
/// Dragging furniture turns the controls off so the same pointer motion does
/// not also swing the camera.
pub struct OrbitControls {
    pub enabled: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl OrbitControls {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            enabled: true,
            rotate_speed,
            zoom_speed,
            pan_speed: 0.01,
        }
    }

    /// Applies a gesture to the camera. Returns false when disabled.
    pub fn apply(&self, input: OrbitInput, camera: &mut OrbitCamera) -> bool {
        if !self.enabled {
            return false;
        }
        match input {
            OrbitInput::Rotate { dx, dy } => {
                camera.add_yaw(-dx * self.rotate_speed);
                camera.add_pitch(dy * self.rotate_speed);
            }
            OrbitInput::Pan { dx, dy } => {
                camera.pan((-dx * self.pan_speed, dy * self.pan_speed));
            }
            OrbitInput::Zoom(amount) => {
                camera.add_distance(amount * self.zoom_speed);
            }
        }
        true
    }

    /// Converts a wheel delta into a zoom gesture
    pub fn scroll_gesture(delta: &MouseScrollDelta) -> OrbitInput {
        let scroll_amount = -match delta {
            MouseScrollDelta::LineDelta(_, scroll) => *scroll,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                *scroll as f32 * 0.1
            }
        };
        OrbitInput::Zoom(scroll_amount)
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(0.005, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector3, Zero};

    #[test]
    fn test_disabled_controls_leave_camera_alone() {
        let mut camera = OrbitCamera::new(Vector3::new(10.0, 10.0, -10.0), Vector3::zero(), 1.0);
        let mut controls = OrbitControls::default();
        controls.enabled = false;

        assert!(!controls.apply(OrbitInput::Rotate { dx: 50.0, dy: 10.0 }, &mut camera));
        assert_eq!(camera.eye, Vector3::new(10.0, 10.0, -10.0));
    }

    #[test]
    fn test_wheel_up_zooms_in() {
        let gesture = OrbitControls::scroll_gesture(&MouseScrollDelta::LineDelta(0.0, 1.0));
        assert_eq!(gesture, OrbitInput::Zoom(-1.0));
    }
}
