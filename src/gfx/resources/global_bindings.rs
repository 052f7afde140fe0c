//! Global uniform bindings for camera and lighting
//!
//! One uniform buffer shared by every draw, bound at group 0.

use crate::{
    gfx::camera::camera_utils::CameraUniform,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Per-frame globals. MUST match `Globals` in furniture.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    light_position: [f32; 3],
    _padding: f32,
    light_color: [f32; 3],
    light_intensity: f32,
    ambient: [f32; 4],
}
// 16 + 64 + 16 + 16 + 16 = 128 bytes

/// Point light plus a flat ambient term
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    pub ambient: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [20.0, 20.0, 20.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            ambient: [0.35, 0.35, 0.35],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Writes camera and light data into the global uniform buffer
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    light: LightConfig,
) {
    let content = GlobalUBOContent {
        view_position: camera.view_position,
        view_proj: camera.view_proj,
        light_position: light.position,
        _padding: 0.0,
        light_color: light.color,
        light_intensity: light.intensity,
        ambient: [light.ambient[0], light.ambient[1], light.ambient[2], 1.0],
    };

    ubo.update_content(queue, content);
}

/// Layout and bind group for the global uniforms (slot 0 in every pipeline)
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_layout_matches_shader_size() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 128);
    }
}
