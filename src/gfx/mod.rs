//! # Graphics Module
//!
//! Everything between the scene description and the pixels on screen.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera and its mouse controls
//! - **Geometry** ([`geometry`]) - Procedural boxes for walls and floor
//! - **Picking** ([`picking`]) - Pointer rays and ray/mesh intersection
//! - **Rendering Pipeline** ([`rendering`]) - Single lit, textured pipeline
//! - **Scene Management** ([`scene`]) - Arena scene graph of meshes and groups
//! - **Resource Management** ([`resources`]) - Global uniforms and GPU textures
//!
//! ## Usage
//!
//! ```no_run
//! use furnish::gfx::{camera::OrbitCamera, scene::SceneGraph};
//! use cgmath::{Vector3, Zero};
//!
//! let graph = SceneGraph::new();
//! let camera = OrbitCamera::new(Vector3::new(10.0, 10.0, -10.0), Vector3::zero(), 16.0 / 9.0);
//! // let render_engine = RenderEngine::new(window, width, height).await?;
//! ```

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
