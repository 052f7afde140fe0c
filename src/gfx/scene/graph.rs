//! Arena-backed scene graph
//!
//! Nodes live in a flat vector indexed by [`NodeId`]. Removing a node clears
//! its slot (and its subtree) without shifting other ids, so ids held by the
//! furniture registry or the selection never alias a different node.

use cgmath::{Matrix4, SquareMatrix};

use super::node::{NodeId, SceneNode};

pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph holding only the root group
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(SceneNode::group("Scene"))],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Adds a node directly under the root
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let root = self.root;
        self.insert(root, node)
    }

    /// Adds a node under `parent`, or returns `None` if the parent is gone
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        Some(self.insert(parent, node))
    }

    fn insert(&mut self, parent: NodeId, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(Some(node));
        if let Some(Some(parent_node)) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(id);
        }
        id
    }

    /// Removes a node and its whole subtree. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }

        let subtree = self.descendants(id);
        if let Some(parent) = self.get(id).and_then(|n| n.parent) {
            if let Some(parent_node) = self.get_mut(parent) {
                parent_node.children.retain(|c| *c != id);
            }
        }
        for node in subtree {
            self.nodes[node.0] = None;
        }
        true
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0).and_then(|n| n.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0).and_then(|n| n.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// True when following parent links from `id` ends at the root
    pub fn is_reachable(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.get(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Depth-first, pre-order traversal starting at (and including) `start`
    pub fn traverse<F>(&self, start: NodeId, mut visit: F)
    where
        F: FnMut(NodeId, &SceneNode),
    {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                visit(id, node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// All nodes of the subtree rooted at `start`, in traversal order
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.traverse(start, |id, _| out.push(id));
        out
    }

    /// Mesh-bearing nodes of the subtree rooted at `start`
    pub fn mesh_descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.traverse(start, |id, node| {
            if node.has_mesh() {
                out.push(id);
            }
        });
        out
    }

    /// Product of local matrices from the root down to `id`
    pub fn world_matrix(&self, id: NodeId) -> Matrix4<f32> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.get(node_id) {
                Some(node) => {
                    matrix = node.transform.matrix() * matrix;
                    current = node.parent;
                }
                None => break,
            }
        }
        matrix
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::node::Transform;
    use cgmath::{InnerSpace, Vector3};

    #[test]
    fn test_traverse_is_depth_first_pre_order() {
        let mut graph = SceneGraph::new();
        let a = graph.add(SceneNode::group("a"));
        let a1 = graph.add_child(a, SceneNode::group("a1")).unwrap();
        let b = graph.add(SceneNode::group("b"));

        let order = graph.descendants(graph.root());
        assert_eq!(order, vec![graph.root(), a, a1, b]);
    }

    #[test]
    fn test_remove_clears_subtree_and_keeps_ids_stable() {
        let mut graph = SceneGraph::new();
        let a = graph.add(SceneNode::group("a"));
        let a1 = graph.add_child(a, SceneNode::group("a1")).unwrap();
        let b = graph.add(SceneNode::group("b"));

        assert!(graph.remove(a));
        assert!(!graph.contains(a));
        assert!(!graph.contains(a1));
        assert!(graph.contains(b));
        assert!(!graph.remove(graph.root()));
        assert_eq!(graph.get(b).unwrap().name, "b");
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut graph = SceneGraph::new();
        let parent = graph.add(
            SceneNode::group("parent")
                .with_transform(Transform::from_position(Vector3::new(10.0, 0.0, 0.0))),
        );
        let child = graph
            .add_child(
                parent,
                SceneNode::group("child")
                    .with_transform(Transform::from_position(Vector3::new(0.0, 2.0, 0.0))),
            )
            .unwrap();

        let p = graph.world_matrix(child).w.truncate();
        assert!((p - Vector3::new(10.0, 2.0, 0.0)).magnitude() < 1e-6);
        assert!(graph.is_reachable(child));
    }
}
