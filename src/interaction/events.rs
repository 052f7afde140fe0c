//! The interaction vocabulary consumed by `AppContext::dispatch`

use cgmath::Vector3;

use crate::gfx::{camera::OrbitInput, scene::NodeId};

/// Keyboard-driven camera movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraNav {
    /// Move eye and target together
    Translate(Vector3<f32>),
    /// Put the eye back at the origin
    ResetPosition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    DragStart {
        item: NodeId,
    },
    /// `position` is the raw projection on the drag plane, before clamping
    DragMove {
        item: NodeId,
        position: Vector3<f32>,
    },
    DragEnd {
        item: NodeId,
    },
    Select {
        item: NodeId,
    },
    RotateChanged {
        item: NodeId,
        radians: f32,
    },
    TextureChanged {
        item: NodeId,
        label: String,
    },
    CameraNav(CameraNav),
    Orbit(OrbitInput),
}
