//! Placed furniture and model instantiation

use std::sync::Arc;

use cgmath::Vector3;
use log::{debug, info};
use thiserror::Error;

use crate::{
    assets::{
        model::{ModelData, ModelNode},
        texture::TextureHandle,
    },
    gfx::scene::{Material, NodeId, SceneGraph, SceneNode},
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("node {0:?} is already registered as furniture")]
    Duplicate(NodeId),

    #[error("node {0:?} is not reachable from the scene root")]
    Unreachable(NodeId),
}

/// A furniture root node placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct FurnitureItem {
    pub node: NodeId,
    /// Stable label, also used to key texture choices
    pub name: String,
    pub draggable: bool,
}

/// Ordered collection of placed furniture.
///
/// Holds node ids only; the scene graph owns the nodes.
#[derive(Debug, Default)]
pub struct FurnitureRegistry {
    items: Vec<FurnitureItem>,
}

impl FurnitureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item, refusing duplicates and nodes detached from the scene
    pub fn register(
        &mut self,
        graph: &SceneGraph,
        item: FurnitureItem,
    ) -> Result<(), RegistryError> {
        if self.items.iter().any(|existing| existing.node == item.node) {
            return Err(RegistryError::Duplicate(item.node));
        }
        if !graph.is_reachable(item.node) {
            return Err(RegistryError::Unreachable(item.node));
        }
        info!("Registered furniture '{}' ({:?})", item.name, item.node);
        self.items.push(item);
        Ok(())
    }

    pub fn items(&self) -> &[FurnitureItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&FurnitureItem> {
        self.items.iter().find(|item| item.node == node)
    }

    /// Root nodes of the items that can be dragged and selected
    pub fn draggable_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items
            .iter()
            .filter(|item| item.draggable)
            .map(|item| item.node)
    }
}

/// Parameters of one furniture placement
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub asset_path: String,
    pub scale: f32,
    pub position: Vector3<f32>,
    pub name: String,
    pub draggable: bool,
    /// Base-color texture put on every mesh once the model has loaded
    pub default_texture: Option<String>,
}

impl PlacementRequest {
    pub fn new(asset_path: &str, scale: f32, position: Vector3<f32>, name: &str) -> Self {
        Self {
            asset_path: asset_path.to_string(),
            scale,
            position,
            name: name.to_string(),
            draggable: true,
            default_texture: None,
        }
    }

    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn with_default_texture(mut self, path: &str) -> Self {
        self.default_texture = Some(path.to_string());
        self
    }
}

/// Copies a loaded model into the scene under a new root.
///
/// The root takes the request's position and uniform scale, and every
/// mesh-bearing node below it is renamed to `request.name`.
pub fn instantiate_model(
    graph: &mut SceneGraph,
    model: &ModelData,
    request: &PlacementRequest,
) -> NodeId {
    let mut root_node = SceneNode::group(request.name.clone()).with_transform(model.root.transform);
    root_node.transform.position = request.position;
    root_node.transform.set_uniform_scale(request.scale);
    let root = graph.add(root_node);

    for mesh in &model.root.meshes {
        let material = Material::flat(&request.name, mesh.base_color);
        graph.add_child(root, SceneNode::mesh("mesh", Arc::clone(&mesh.mesh), material));
    }
    for child in &model.root.children {
        add_model_node(graph, root, child, &request.name);
    }

    for mesh_node in graph.mesh_descendants(root) {
        if let Some(node) = graph.get_mut(mesh_node) {
            node.name = request.name.clone();
        }
    }
    debug!(
        "Instantiated '{}' with {} nodes",
        request.name,
        graph.descendants(root).len()
    );

    root
}

fn add_model_node(graph: &mut SceneGraph, parent: NodeId, node: &ModelNode, label: &str) {
    let Some(id) = graph.add_child(
        parent,
        SceneNode::group(node.name.clone()).with_transform(node.transform),
    ) else {
        return;
    };

    for mesh in &node.meshes {
        let material = Material::flat(label, mesh.base_color);
        graph.add_child(id, SceneNode::mesh("mesh", Arc::clone(&mesh.mesh), material));
    }
    for child in &node.children {
        add_model_node(graph, id, child, label);
    }
}

/// Replaces the color map on every mesh below `root`. Returns how many
/// meshes were updated.
pub fn apply_texture(graph: &mut SceneGraph, root: NodeId, texture: &TextureHandle) -> usize {
    let meshes = graph.mesh_descendants(root);
    for id in &meshes {
        if let Some(material) = graph.get_mut(*id).and_then(|n| n.material_mut()) {
            material.set_map(texture.clone());
        }
    }
    meshes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::texture::{TextureImage, TextureSettings},
        gfx::{
            geometry::{generate_box, generate_cube},
            scene::MeshData,
        },
    };

    fn two_part_model() -> ModelData {
        let seat = Arc::new(MeshData::from_geometry(&generate_cube()));
        let back = Arc::new(MeshData::from_geometry(&generate_box(1.0, 2.0, 0.1)));
        ModelData::new(
            ModelNode::new("Sketchfab_Scene").with_child(
                ModelNode::new("Chair_Root")
                    .with_child(ModelNode::new("Seat").with_mesh(seat, [1.0; 4]))
                    .with_child(ModelNode::new("Back").with_mesh(back, [1.0; 4])),
            ),
        )
    }

    #[test]
    fn test_instantiate_labels_meshes_and_places_root() {
        let mut graph = SceneGraph::new();
        let request = PlacementRequest::new("chair.gltf", 2.0, Vector3::new(10.0, 0.0, 0.0), "chair");
        let root = instantiate_model(&mut graph, &two_part_model(), &request);

        let node = graph.get(root).unwrap();
        assert_eq!(node.transform.position, Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(node.transform.scale, Vector3::new(2.0, 2.0, 2.0));

        let meshes = graph.mesh_descendants(root);
        assert_eq!(meshes.len(), 2);
        for id in meshes {
            assert_eq!(graph.get(id).unwrap().name, "chair");
        }
    }

    #[test]
    fn test_register_rejects_duplicates_and_detached_nodes() {
        let mut graph = SceneGraph::new();
        let request = PlacementRequest::new("chair.gltf", 1.0, Vector3::new(0.0, 0.0, 0.0), "chair");
        let root = instantiate_model(&mut graph, &two_part_model(), &request);
        let mut registry = FurnitureRegistry::new();

        let item = FurnitureItem {
            node: root,
            name: "chair".to_string(),
            draggable: true,
        };
        assert!(registry.register(&graph, item.clone()).is_ok());
        assert_eq!(
            registry.register(&graph, item),
            Err(RegistryError::Duplicate(root))
        );

        graph.remove(root);
        let detached = FurnitureItem {
            node: root,
            name: "ghost".to_string(),
            draggable: true,
        };
        let mut fresh = FurnitureRegistry::new();
        assert_eq!(
            fresh.register(&graph, detached),
            Err(RegistryError::Unreachable(root))
        );
    }

    #[test]
    fn test_apply_texture_covers_every_mesh() {
        let mut graph = SceneGraph::new();
        let request = PlacementRequest::new("chair.gltf", 1.0, Vector3::new(0.0, 0.0, 0.0), "chair");
        let root = instantiate_model(&mut graph, &two_part_model(), &request);
        let texture = TextureHandle::new(
            "base.png",
            TextureImage::solid([10, 20, 30, 255]),
            TextureSettings::surface(),
        );

        assert_eq!(apply_texture(&mut graph, root, &texture), 2);
        for id in graph.mesh_descendants(root) {
            let map = graph.get(id).and_then(|n| n.material()).and_then(|m| m.map.clone());
            assert_eq!(map, Some(texture.clone()));
        }
    }
}
