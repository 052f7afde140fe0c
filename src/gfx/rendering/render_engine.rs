//! WGPU-based renderer for the room and its furniture
//!
//! Walks the scene graph each frame, keeps one set of GPU buffers per mesh
//! node and one bind group per texture, and draws everything with a single
//! lit pipeline before handing the encoder to the UI overlay.

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use cgmath::Matrix4;
use log::{debug, info, warn};
use wgpu::util::DeviceExt;

use crate::{
    assets::texture::{TextureHandle, TextureId},
    gfx::{
        camera::camera_utils::{convert_matrix4_to_array, CameraUniform},
        resources::{
            global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightConfig},
            texture_resource::TextureResource,
        },
        scene::{MeshComponent, MeshData, NodeId, SceneGraph},
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const FURNITURE_PIPELINE: &str = "Furniture";

/// Per-node uniforms. MUST match `NodeUniform` in furniture.wgsl.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    model: [[f32; 4]; 4],
    base_color: [f32; 4],
    uv_scale: [f32; 2],
    _padding: [f32; 2],
}

struct NodeGpu {
    mesh: Arc<MeshData>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform: UniformBuffer<NodeUniform>,
    bind_group: wgpu::BindGroup,
    texture: Option<TextureId>,
}

struct TextureGpu {
    _resource: TextureResource,
    bind_group: wgpu::BindGroup,
}

struct DrawItem<'a> {
    node: NodeId,
    world: Matrix4<f32>,
    mesh: &'a MeshComponent,
}

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: wgpu::TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    light_config: LightConfig,
    node_layout: BindGroupLayoutWithDesc,
    texture_layout: BindGroupLayoutWithDesc,
    node_cache: HashMap<NodeId, NodeGpu>,
    texture_cache: HashMap<TextureId, TextureGpu>,
    fallback_texture: TextureGpu,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates the surface, device and furniture pipeline for `window`
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> anyhow::Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to request a device")?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .context("Surface reports no texture formats")?;
        info!("Surface format: {:?}", format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let node_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Node Bind Group Layout");
        let texture_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_2d())
            .next_binding_fragment(binding_types::sampler(
                wgpu::SamplerBindingType::Filtering,
            ))
            .create(&device, "Texture Bind Group Layout");

        let fallback = TextureResource::white(&device, &queue);
        let fallback_texture = Self::texture_gpu(&device, &texture_layout, fallback, "fallback");

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("furniture", include_str!("furniture.wgsl"));
        pipeline_manager.register_pipeline(
            FURNITURE_PIPELINE,
            PipelineConfig::default()
                .with_label("FURNITURE")
                .with_shader("furniture")
                .with_color_format(format)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                // Model files do not agree on winding
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    node_layout.layout.clone(),
                    texture_layout.layout.clone(),
                ]),
        );
        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            anyhow::bail!("Pipeline creation failed: {}", errors.join("; "));
        }

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            light_config: LightConfig::default(),
            node_layout,
            texture_layout,
            node_cache: HashMap::new(),
            texture_cache: HashMap::new(),
            fallback_texture,
            clear_color: wgpu::Color::WHITE,
        })
    }

    fn texture_gpu(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        resource: TextureResource,
        label: &str,
    ) -> TextureGpu {
        let bind_group = BindGroupBuilder::new(layout)
            .texture(&resource.view)
            .sampler(&resource.sampler)
            .create(device, &format!("Texture Bind Group: {}", label));
        TextureGpu {
            _resource: resource,
            bind_group,
        }
    }

    /// Visible mesh nodes with their world matrices; hidden nodes hide their subtree
    fn collect_draws(graph: &SceneGraph) -> Vec<DrawItem<'_>> {
        let mut draws = Vec::new();
        let mut stack = vec![(graph.root(), Matrix4::from_scale(1.0))];

        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = graph.get(id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            if let Some(mesh) = node.mesh.as_ref() {
                draws.push(DrawItem {
                    node: id,
                    world,
                    mesh,
                });
            }
            stack.extend(node.children().iter().map(|child| (*child, world)));
        }

        draws
    }

    fn ensure_texture(&mut self, handle: &TextureHandle) {
        if self.texture_cache.contains_key(&handle.id()) {
            return;
        }
        debug!("Uploading texture {} ({:?})", handle.label(), handle.id());
        let resource = TextureResource::from_handle(&self.device, &self.queue, handle);
        let gpu = Self::texture_gpu(&self.device, &self.texture_layout, resource, handle.label());
        self.texture_cache.insert(handle.id(), gpu);
    }

    fn sync_node(&mut self, draw: &DrawItem) {
        let material = &draw.mesh.material;
        let stale = self
            .node_cache
            .get(&draw.node)
            .map_or(true, |cached| !Arc::ptr_eq(&cached.mesh, &draw.mesh.mesh));

        if stale {
            let mesh = &draw.mesh.mesh;
            let vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Vertex Buffer"),
                    contents: bytemuck::cast_slice(mesh.vertices()),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Index Buffer"),
                    contents: bytemuck::cast_slice(mesh.indices()),
                    usage: wgpu::BufferUsages::INDEX,
                });
            let uniform = UniformBuffer::<NodeUniform>::new(&self.device);
            let bind_group = BindGroupBuilder::new(&self.node_layout)
                .resource(uniform.binding_resource())
                .create(&self.device, "Node Bind Group");

            self.node_cache.insert(
                draw.node,
                NodeGpu {
                    mesh: Arc::clone(mesh),
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices().len() as u32,
                    uniform,
                    bind_group,
                    texture: None,
                },
            );
        }

        if let Some(map) = material.map.as_ref() {
            self.ensure_texture(map);
        }

        let uv_scale = material
            .map
            .as_ref()
            .map(|m| m.settings().repeat)
            .unwrap_or([1.0, 1.0]);
        let content = NodeUniform {
            model: convert_matrix4_to_array(draw.world),
            base_color: material.base_color,
            uv_scale,
            _padding: [0.0; 2],
        };

        if let Some(cached) = self.node_cache.get_mut(&draw.node) {
            cached.uniform.update_content(&self.queue, content);
            cached.texture = material.map.as_ref().map(|m| m.id());
        }
    }

    /// Renders the scene, then lets `ui_callback` record into the same frame
    pub fn render_frame<F>(
        &mut self,
        graph: &SceneGraph,
        camera: CameraUniform,
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera, self.light_config);

        let draws = Self::collect_draws(graph);
        for draw in &draws {
            self.sync_node(draw);
        }

        // Drop GPU data for removed nodes and textures nothing references
        self.node_cache
            .retain(|id, _| draws.iter().any(|d| d.node == *id));
        let live_textures: Vec<TextureId> =
            self.node_cache.values().filter_map(|n| n.texture).collect();
        self.texture_cache
            .retain(|id, _| live_textures.contains(id));

        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(FURNITURE_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

                for draw in &draws {
                    let Some(gpu) = self.node_cache.get(&draw.node) else {
                        continue;
                    };
                    let texture = gpu
                        .texture
                        .and_then(|id| self.texture_cache.get(&id))
                        .unwrap_or(&self.fallback_texture);

                    render_pass.set_bind_group(1, &gpu.bind_group, &[]);
                    render_pass.set_bind_group(2, &texture.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                    render_pass
                        .set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
                }
            } else {
                warn!("Furniture pipeline missing, skipping scene pass");
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{
        geometry::generate_cube,
        scene::{Material, SceneNode},
    };

    #[test]
    fn test_node_uniform_matches_shader_size() {
        assert_eq!(std::mem::size_of::<NodeUniform>(), 96);
    }

    #[test]
    fn test_hidden_group_hides_its_meshes() {
        let mut graph = SceneGraph::new();
        let mesh = Arc::new(MeshData::from_geometry(&generate_cube()));
        let shown = graph.add(SceneNode::mesh("shown", mesh.clone(), Material::default()));
        let group = graph.add(SceneNode::group("hidden"));
        graph
            .add_child(group, SceneNode::mesh("child", mesh, Material::default()))
            .unwrap();
        graph.get_mut(group).unwrap().visible = false;

        let draws = RenderEngine::collect_draws(&graph);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].node, shown);
    }
}
