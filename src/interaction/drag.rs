//! Plane-constrained dragging

use cgmath::Vector3;
use serde::Deserialize;

use crate::gfx::{
    picking::{Plane, Ray},
    scene::{Axis, NodeId},
};

/// Holds one coordinate of every dragged position at a fixed value
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DragConstraint {
    pub axis: Axis,
    pub value: f32,
}

impl Default for DragConstraint {
    fn default() -> Self {
        Self {
            axis: Axis::Z,
            value: 0.0,
        }
    }
}

impl DragConstraint {
    pub fn clamp(&self, mut position: Vector3<f32>) -> Vector3<f32> {
        self.axis.set(&mut position, self.value);
        position
    }
}

/// An in-progress drag of one item.
///
/// The pointer is projected onto a plane through the grab point facing the
/// camera; `offset` keeps the grab point under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub item: NodeId,
    plane: Plane,
    offset: Vector3<f32>,
}

impl DragSession {
    pub fn begin(
        item: NodeId,
        grab_point: Vector3<f32>,
        item_position: Vector3<f32>,
        camera_forward: Vector3<f32>,
    ) -> Self {
        Self {
            item,
            plane: Plane::new(grab_point, camera_forward),
            offset: grab_point - item_position,
        }
    }

    /// Unclamped item position for a pointer ray, `None` if the ray misses the plane
    pub fn project(&self, ray: &Ray) -> Option<Vector3<f32>> {
        self.plane.intersect_ray(ray).map(|hit| hit - self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn test_clamp_only_touches_configured_axis() {
        let constraint = DragConstraint::default();
        let clamped = constraint.clamp(Vector3::new(3.0, 4.0, 5.0));
        assert_eq!(clamped, Vector3::new(3.0, 4.0, 0.0));

        let floor = DragConstraint {
            axis: Axis::Y,
            value: -7.5,
        };
        assert_eq!(floor.clamp(Vector3::new(3.0, 4.0, 5.0)), Vector3::new(3.0, -7.5, 5.0));
    }

    #[test]
    fn test_projection_keeps_grab_offset() {
        let session = DragSession::begin(
            NodeId(1),
            Vector3::new(10.0, 1.0, 0.0),
            Vector3::new(10.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        let ray = Ray::new(Vector3::new(12.0, 1.0, -20.0), Vector3::new(0.0, 0.0, 1.0));
        let position = session.project(&ray).unwrap();
        assert!((position - Vector3::new(12.0, 0.0, 0.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_sessions_compare_by_plane_and_offset() {
        let begin = |grab: Vector3<f32>| {
            DragSession::begin(NodeId(1), grab, Vector3::new(0.0, 0.0, 0.0), Vector3::unit_z())
        };
        assert_eq!(begin(Vector3::new(0.0, 1.0, 0.0)), begin(Vector3::new(0.0, 1.0, 0.0)));
        assert_ne!(begin(Vector3::new(0.0, 1.0, 0.0)), begin(Vector3::new(0.0, 1.0, 2.0)));

        let plane = Plane::new(Vector3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, 4.0));
        assert_eq!(plane, Plane::new(Vector3::new(0.0, 0.0, 2.0), Vector3::unit_z()));
    }
}
