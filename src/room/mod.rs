//! # Room Module
//!
//! The static room shell and the furniture placed inside it.
//!
//! - [`build_room`] adds the walls and floor once at startup
//! - [`FurnitureRegistry`] tracks placed furniture by root node
//! - [`instantiate_model`] copies a loaded model into the scene graph

pub mod registry;
pub mod walls;

pub use registry::{
    apply_texture, instantiate_model, FurnitureItem, FurnitureRegistry, PlacementRequest,
    RegistryError,
};
pub use walls::{build_room, Room, RoomDimensions, WallKind, WallSegment};
