//! Core rendering functionality
//!
//! Render pipelines and per-frame drawing of the scene graph.

pub mod pipeline_manager;
pub mod render_engine;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager};
pub use render_engine::RenderEngine;
