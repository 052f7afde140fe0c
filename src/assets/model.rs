//! Decoded model hierarchies, independent of the file format they came from

use std::sync::Arc;

use crate::gfx::scene::{MeshData, Transform};

/// A mesh together with the base color its source material declared
#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub mesh: Arc<MeshData>,
    pub base_color: [f32; 4],
}

#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    pub meshes: Vec<ModelMesh>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: Arc<MeshData>, base_color: [f32; 4]) -> Self {
        self.meshes.push(ModelMesh { mesh, base_color });
        self
    }

    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }

    fn mesh_count(&self) -> usize {
        self.meshes.len() + self.children.iter().map(|c| c.mesh_count()).sum::<usize>()
    }
}

/// A loaded model file. `root` holds the file's top-level nodes as children.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub root: ModelNode,
}

impl ModelData {
    pub fn new(root: ModelNode) -> Self {
        Self { root }
    }

    /// A model made of a single mesh under the root
    pub fn single_mesh(name: &str, mesh: MeshData) -> Self {
        Self::new(
            ModelNode::new(name).with_child(
                ModelNode::new(format!("{name}_mesh")).with_mesh(Arc::new(mesh), [1.0; 4]),
            ),
        )
    }

    pub fn mesh_count(&self) -> usize {
        self.root.mesh_count()
    }
}
