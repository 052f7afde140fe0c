//! Scene nodes and their local transforms

use std::sync::Arc;

use cgmath::{Euler, Matrix4, Quaternion, Rad, Vector3, Zero};
use serde::Deserialize;

use super::{material::Material, mesh::MeshData};

/// Stable handle to a node in a [`SceneGraph`](super::SceneGraph).
///
/// Ids are never reused, so a handle to a removed node stays invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// One of the three coordinate axes of the room frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Reads this axis' component of `v`
    pub fn get(self, v: Vector3<f32>) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Overwrites this axis' component of `v`
    pub fn set(self, v: &mut Vector3<f32>, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// Local position, rotation (XYZ Euler, radians) and non-uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: set rotation in radians
    pub fn with_rotation(mut self, rotation: Vector3<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: set non-uniform scale
    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }

    /// Local matrix, composed as T * R * S
    pub fn matrix(&self) -> Matrix4<f32> {
        let rotation = Quaternion::from(Euler::new(
            Rad(self.rotation.x),
            Rad(self.rotation.y),
            Rad(self.rotation.z),
        ));
        Matrix4::from_translation(self.position)
            * Matrix4::from(rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Geometry plus the material it is drawn with
#[derive(Debug, Clone)]
pub struct MeshComponent {
    pub mesh: Arc<MeshData>,
    pub material: Material,
}

/// A node of the scene graph.
///
/// Group nodes have no mesh; leaf nodes usually do. Parent and child links
/// are maintained by the graph.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub mesh: Option<MeshComponent>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    /// Creates an empty group node
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            visible: true,
            mesh: None,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Creates a mesh-bearing node
    pub fn mesh(name: impl Into<String>, mesh: Arc<MeshData>, material: Material) -> Self {
        Self {
            mesh: Some(MeshComponent { mesh, material }),
            ..Self::group(name)
        }
    }

    /// Builder pattern: set the local transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn material(&self) -> Option<&Material> {
        self.mesh.as_ref().map(|m| &m.material)
    }

    pub fn material_mut(&mut self) -> Option<&mut Material> {
        self.mesh.as_mut().map(|m| &mut m.material)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_axis_get_set() {
        let mut v = Vector3::new(1.0, 2.0, 3.0);
        Axis::Z.set(&mut v, 0.0);
        assert_eq!(v, Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(Axis::Y.get(v), 2.0);
    }

    #[test]
    fn test_transform_matrix_applies_scale_before_translation() {
        let transform = Transform::from_position(Vector3::new(10.0, 0.0, 0.0))
            .with_scale(Vector3::new(2.0, 2.0, 2.0));
        let p = transform.matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x - 12.0).abs() < 1e-5);
    }
}
