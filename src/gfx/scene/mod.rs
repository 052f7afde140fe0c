//! # Scene Management Module
//!
//! The scene graph and the data it holds: nodes with local transforms,
//! triangle meshes, materials and the vertex format uploaded to the GPU.
//!
//! ## Key Components
//!
//! - [`SceneGraph`] - Arena of nodes rooted at a single group
//! - [`SceneNode`] - Named node with a [`Transform`] and optional mesh
//! - [`MeshData`] - Immutable triangle mesh with cached bounds
//! - [`Material`] - Flat color plus optional texture map
//! - [`Vertex3D`] - GPU vertex (position, normal, uv)
//!
//! ## Usage
//!
//! ```no_run
//! use furnish::gfx::scene::{SceneGraph, SceneNode};
//!
//! let mut graph = SceneGraph::new();
//! let group = graph.add(SceneNode::group("chair"));
//! graph.traverse(group, |id, node| println!("{:?} {}", id, node.name));
//! ```

pub mod graph;
pub mod material;
pub mod mesh;
pub mod node;
pub mod vertex;

// Re-export main types
pub use graph::SceneGraph;
pub use material::Material;
pub use mesh::MeshData;
pub use node::{Axis, MeshComponent, NodeId, SceneNode, Transform};
pub use vertex::Vertex3D;
