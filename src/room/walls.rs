//! The fixed room shell: two side walls, two end walls and a floor

use std::{f32::consts::FRAC_PI_2, sync::Arc};

use cgmath::Vector3;
use log::debug;
use serde::Deserialize;

use crate::{
    assets::texture::TextureHandle,
    gfx::{
        geometry::generate_box,
        scene::{Material, MeshData, NodeId, SceneGraph, SceneNode, Transform},
    },
};

/// Room extents. Walls are centred on y = 0; the floor sits at `floor_y`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomDimensions {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub wall_thickness: f32,
    pub floor_thickness: f32,
    pub floor_y: f32,
}

impl Default for RoomDimensions {
    fn default() -> Self {
        Self {
            width: 50.0,
            depth: 100.0,
            height: 15.0,
            wall_thickness: 0.5,
            floor_thickness: 0.01,
            floor_y: -7.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallKind {
    Side,
    End,
    Floor,
}

/// A static box of the room shell. Never draggable, never selectable.
#[derive(Debug, Clone, PartialEq)]
pub struct WallSegment {
    pub node: NodeId,
    pub kind: WallKind,
    /// Box size before rotation (width, height, depth)
    pub size: [f32; 3],
    pub position: Vector3<f32>,
}

/// The wall collection, read-only once built
#[derive(Debug, Default)]
pub struct Room {
    segments: Vec<WallSegment>,
}

impl Room {
    pub fn segments(&self) -> &[WallSegment] {
        &self.segments
    }

    pub fn floor(&self) -> Option<&WallSegment> {
        self.segments.iter().find(|s| s.kind == WallKind::Floor)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.segments.iter().any(|s| s.node == node)
    }

    /// Puts a tiled texture on the floor. Returns false if there is no floor.
    pub fn texture_floor(&self, graph: &mut SceneGraph, texture: TextureHandle) -> bool {
        let Some(material) = self
            .floor()
            .and_then(|floor| graph.get_mut(floor.node))
            .and_then(|node| node.material_mut())
        else {
            return false;
        };
        material.set_map(texture);
        true
    }
}

/// Adds the five room segments to `graph` and returns the wall collection.
///
/// Every segment starts with a flat white material; the floor texture is
/// applied separately once its image has loaded.
pub fn build_room(graph: &mut SceneGraph, dims: &RoomDimensions) -> Room {
    let half_width = dims.width / 2.0;
    let half_depth = dims.depth / 2.0;

    let layout = [
        (
            "wall_side_pos_x",
            WallKind::Side,
            [dims.wall_thickness, dims.height, dims.depth],
            Vector3::new(half_width, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
        ),
        (
            "wall_side_neg_x",
            WallKind::Side,
            [dims.wall_thickness, dims.height, dims.depth],
            Vector3::new(-half_width, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 0.0),
        ),
        (
            "wall_end_neg_z",
            WallKind::End,
            [dims.wall_thickness, dims.height, dims.width],
            Vector3::new(0.0, 0.0, -half_depth),
            Vector3::new(0.0, FRAC_PI_2, 0.0),
        ),
        (
            "wall_end_pos_z",
            WallKind::End,
            [dims.wall_thickness, dims.height, dims.width],
            Vector3::new(0.0, 0.0, half_depth),
            Vector3::new(0.0, FRAC_PI_2, 0.0),
        ),
        (
            "floor",
            WallKind::Floor,
            [dims.floor_thickness, dims.width, dims.depth],
            Vector3::new(0.0, dims.floor_y, 0.0),
            Vector3::new(0.0, 0.0, FRAC_PI_2),
        ),
    ];

    let mut room = Room::default();
    for (name, kind, size, position, rotation) in layout {
        let mesh = Arc::new(MeshData::from_geometry(&generate_box(
            size[0], size[1], size[2],
        )));
        let node = graph.add(
            SceneNode::mesh(name, mesh, Material::white(name))
                .with_transform(Transform::from_position(position).with_rotation(rotation)),
        );
        debug!("Built {} at {:?}", name, position);
        room.segments.push(WallSegment {
            node,
            kind,
            size,
            position,
        });
    }

    room
}
