use cgmath::{Matrix4, SquareMatrix, Vector3};

use super::{
    camera_controller::{OrbitControls, OrbitInput},
    orbit_camera::OrbitCamera,
};

/// Owns the viewer camera and the orbit controls that drive it
pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controls: OrbitControls,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controls: OrbitControls) -> Self {
        Self { camera, controls }
    }

    pub fn orbit_enabled(&self) -> bool {
        self.controls.enabled
    }

    pub fn set_orbit_enabled(&mut self, enabled: bool) {
        self.controls.enabled = enabled;
    }

    /// Routes a gesture through the controls; ignored while orbit is off
    pub fn apply_orbit(&mut self, input: OrbitInput) -> bool {
        self.controls.apply(input, &mut self.camera)
    }

    /// Points the orbit at a new target without moving the eye
    pub fn set_orbit_target(&mut self, target: Vector3<f32>) {
        self.camera.set_target(target);
    }

    pub fn get_view_proj_matrix(&self) -> Matrix4<f32> {
        self.camera.build_view_projection_matrix()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// Eye position in homogeneous coordinates, padded to 16 bytes
    pub view_position: [f32; 4],
    pub view_proj: [[f32; 4]; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: convert_matrix4_to_array(Matrix4::identity()),
        }
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
