//! Named render pipelines for the scene pass
//!
//! Shaders are compiled up front; pipeline descriptions are queued by name
//! and built together once the bind group layouts they reference exist.

use std::{collections::HashMap, sync::Arc};

use log::debug;
use thiserror::Error;
use wgpu::*;

use crate::gfx::scene::vertex::Vertex3D;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline '{pipeline}' references unknown shader '{shader}'")]
    MissingShader { pipeline: String, shader: String },
}

/// How a scene pipeline should be built. Every pipeline consumes
/// [`Vertex3D`] triangle lists with `vs_main`/`fs_main` entry points.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub cull_mode: Option<Face>,
    pub color_format: TextureFormat,
    pub depth_format: Option<TextureFormat>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Scene".to_string(),
            shader: String::new(),
            bind_group_layouts: Vec::new(),
            cull_mode: Some(Face::Back),
            color_format: TextureFormat::Bgra8UnormSrgb,
            depth_format: None,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables depth testing against a target of the given format
    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    fn depth_stencil(&self) -> Option<DepthStencilState> {
        self.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        })
    }
}

pub struct PipelineManager {
    device: Arc<Device>,
    shaders: HashMap<String, ShaderModule>,
    queued: Vec<(String, PipelineConfig)>,
    pipelines: HashMap<String, RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            queued: Vec::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles WGSL `source` and stores it under `name`
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shaders.insert(name.to_owned(), module);
    }

    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.queued.push((name.to_owned(), config));
    }

    /// Builds every queued pipeline, reporting all failures at once
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, config) in std::mem::take(&mut self.queued) {
            match self.build(&name, &config) {
                Ok(pipeline) => {
                    debug!("Built pipeline '{}'", name);
                    self.pipelines.insert(name, pipeline);
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn get_pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    fn build(&self, name: &str, config: &PipelineConfig) -> Result<RenderPipeline, PipelineError> {
        let shader = self
            .shaders
            .get(&config.shader)
            .ok_or_else(|| PipelineError::MissingShader {
                pipeline: name.to_owned(),
                shader: config.shader.clone(),
            })?;

        let layouts: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", name)),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });

        let targets = [Some(ColorTargetState {
            format: config.color_format,
            blend: Some(BlendState::REPLACE),
            write_mask: ColorWrites::ALL,
        })];

        Ok(self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex3D::desc()],
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                cull_mode: config.cull_mode,
                ..Default::default()
            },
            depth_stencil: config.depth_stencil(),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        }))
    }
}
