//! GPU resource management
//!
//! Global uniforms and textures for rendering.

pub mod global_bindings;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO, LightConfig};
pub use texture_resource::TextureResource;
